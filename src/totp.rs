use std::fmt;
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::hotp::{self, DEFAULT_DIGITS, DEFAULT_WINDOW};
use crate::secret::Secret;
use crate::uri;

/// Default code period in seconds (RFC 6238 recommendation)
pub const DEFAULT_PERIOD: u64 = 30;

/// TOTP: time-based one-time passwords (RFC 6238)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totp {
    /// Account provider name, empty when unset
    #[serde(default)]
    pub issuer: CompactString,
    /// Account label
    #[serde(default = "hotp::default_label")]
    pub label: CompactString,
    /// Shared secret key
    pub secret: Secret,
    /// Hash algorithm for the HMAC
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Number of code digits
    #[serde(default = "hotp::default_digits")]
    pub digits: u32,
    /// Code lifetime in seconds, must be non-zero
    #[serde(default = "default_period")]
    pub period: u64,
}

fn default_period() -> u64 {
    DEFAULT_PERIOD
}

impl Totp {
    /// Create a TOTP generator over `secret` with default settings
    pub fn new(secret: Secret) -> Self {
        Self {
            issuer: CompactString::default(),
            label: hotp::default_label(),
            secret,
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
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

    /// Set the code period in seconds
    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }

    /// The counter value in effect at `timestamp_ms` (Unix milliseconds)
    pub fn counter_at(&self, timestamp_ms: u64) -> u64 {
        timestamp_ms / 1000 / self.period
    }

    /// Milliseconds left before the code at `timestamp_ms` expires
    pub fn remaining_at(&self, timestamp_ms: u64) -> u64 {
        let period_ms = self.period * 1000;
        period_ms - timestamp_ms % period_ms
    }

    /// Milliseconds left before the current code expires
    pub fn remaining(&self) -> u64 {
        self.remaining_at(now_millis())
    }

    /// Generate the code for the current time
    pub fn generate(&self) -> String {
        self.generate_at(now_millis())
    }

    /// Generate the code in effect at `timestamp_ms`
    pub fn generate_at(&self, timestamp_ms: u64) -> String {
        hotp::generate_code(
            self.secret.as_bytes(),
            self.counter_at(timestamp_ms),
            self.algorithm,
            self.digits,
        )
    }

    /// Validate `token` against the current time with the default window.
    ///
    /// Returns the drift in whole periods of the matching code, or `None`.
    pub fn validate(&self, token: &str) -> Option<i64> {
        self.validate_at(token, now_millis(), DEFAULT_WINDOW)
    }

    /// Validate `token` against an explicit timestamp and window
    pub fn validate_at(&self, token: &str, timestamp_ms: u64, window: u32) -> Option<i64> {
        hotp::search_window(
            self.secret.as_bytes(),
            token,
            self.counter_at(timestamp_ms),
            window,
            self.algorithm,
            self.digits,
        )
    }

    /// Canonical `otpauth://totp/` URI for this configuration
    pub fn to_uri(&self) -> String {
        uri::format_uri(
            "totp",
            &self.issuer,
            &self.label,
            &self.secret,
            self.algorithm,
            self.digits,
            "period",
            self.period,
        )
    }
}

impl fmt::Display for Totp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

fn now_millis() -> u64 {
    // SAFE: The system clock is always after the UNIX epoch.
    #[allow(clippy::unwrap_used)]
    let elapsed = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap();
    elapsed.as_millis() as u64
}
