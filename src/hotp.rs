use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::algorithm::Algorithm;
use crate::secret::Secret;
use crate::uri;

/// Default account label used in `otpauth://` URIs
pub const DEFAULT_LABEL: &str = "OTPAuth";

/// Default number of code digits
pub const DEFAULT_DIGITS: u32 = 6;

/// Default validation window, in counter steps either side of the target
pub const DEFAULT_WINDOW: u32 = 1;

/// Compute a single RFC 4226 code.
///
/// The counter is encoded as 8 big-endian bytes and signed with the keyed
/// hash; dynamic truncation selects 4 digest bytes via the final nibble, the
/// top bit is masked off, and the result is reduced modulo `10^digits` and
/// rendered left-zero-padded.
pub fn generate_code(secret: &[u8], counter: u64, algorithm: Algorithm, digits: u32) -> String {
    let digest = algorithm.sign(secret, &counter.to_be_bytes());
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let truncated = ((digest[offset] & 0x7f) as u64) << 24
        | (digest[offset + 1] as u64) << 16
        | (digest[offset + 2] as u64) << 8
        | digest[offset + 3] as u64;
    let code = match 10u64.checked_pow(digits) {
        Some(modulus) => truncated % modulus,
        None => truncated,
    };
    format!("{:0>width$}", code, width = digits as usize)
}

/// Scan counters `counter + delta` for `delta` in `[-window, +window]`,
/// ascending, and return the first `delta` whose code matches `token`.
///
/// Candidates below zero (or past `u64::MAX`) are skipped. Token comparison
/// is constant-time, so malformed tokens are ordinary non-matches.
pub(crate) fn search_window(
    secret: &[u8],
    token: &str,
    counter: u64,
    window: u32,
    algorithm: Algorithm,
    digits: u32,
) -> Option<i64> {
    for delta in -i64::from(window)..=i64::from(window) {
        let Some(candidate) = counter.checked_add_signed(delta) else {
            continue;
        };
        let code = generate_code(secret, candidate, algorithm, digits);
        if bool::from(code.as_bytes().ct_eq(token.as_bytes())) {
            tracing::trace!(delta, "token accepted within window");
            return Some(delta);
        }
    }
    None
}

/// HOTP: counter-based one-time passwords (RFC 4226)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotp {
    /// Account provider name, empty when unset
    #[serde(default)]
    pub issuer: CompactString,
    /// Account label
    #[serde(default = "default_label")]
    pub label: CompactString,
    /// Shared secret key
    pub secret: Secret,
    /// Hash algorithm for the HMAC
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Number of code digits
    #[serde(default = "default_digits")]
    pub digits: u32,
    /// Moving counter; incremented by [Hotp::generate]
    #[serde(default)]
    pub counter: u64,
}

pub(crate) fn default_label() -> CompactString {
    CompactString::const_new(DEFAULT_LABEL)
}

pub(crate) fn default_digits() -> u32 {
    DEFAULT_DIGITS
}

impl Hotp {
    /// Create a HOTP generator over `secret` with default settings
    pub fn new(secret: Secret) -> Self {
        Self {
            issuer: CompactString::default(),
            label: default_label(),
            secret,
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            counter: 0,
        }
    }

    /// Set the issuer
    pub fn with_issuer(mut self, issuer: impl Into<CompactString>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the account label
    pub fn with_label(mut self, label: impl Into<CompactString>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the hash algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the number of code digits
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// Set the counter start value
    pub fn with_counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    /// Generate a code for the current counter value and advance the counter.
    ///
    /// The read-use-increment is one logical step; `&mut self` makes callers
    /// serialize access to a shared instance.
    pub fn generate(&mut self) -> String {
        let counter = self.counter;
        self.counter += 1;
        self.generate_at(counter)
    }

    /// Generate a code for an explicit counter value, without touching the
    /// instance counter
    pub fn generate_at(&self, counter: u64) -> String {
        generate_code(self.secret.as_bytes(), counter, self.algorithm, self.digits)
    }

    /// Validate `token` against the current counter with the default window.
    ///
    /// Returns the counter offset of the matching code, or `None`. The
    /// instance counter is read but never advanced; accepting the offset is
    /// the caller's resynchronization decision.
    pub fn validate(&self, token: &str) -> Option<i64> {
        self.validate_at(token, self.counter, DEFAULT_WINDOW)
    }

    /// Validate `token` against an explicit counter and window
    pub fn validate_at(&self, token: &str, counter: u64, window: u32) -> Option<i64> {
        search_window(
            self.secret.as_bytes(),
            token,
            counter,
            window,
            self.algorithm,
            self.digits,
        )
    }

    /// Canonical `otpauth://hotp/` URI for this configuration
    pub fn to_uri(&self) -> String {
        uri::format_uri(
            "hotp",
            &self.issuer,
            &self.label,
            &self.secret,
            self.algorithm,
            self.digits,
            "counter",
            self.counter,
        )
    }
}

impl fmt::Display for Hotp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
