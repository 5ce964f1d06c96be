use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;

use crate::algorithm::{Algorithm, UnsupportedAlgorithm};
use crate::hotp::{self, Hotp};
use crate::secret::Secret;
use crate::totp::{self, Totp};

/// Error type for `otpauth://` URI parsing
#[derive(Debug, thiserror::Error)]
pub enum UriError {
    /// Not an `otpauth://hotp/` or `otpauth://totp/` URI
    #[error("invalid otpauth uri")]
    InvalidScheme,

    /// The `secret` parameter is missing or is not valid Base32
    #[error("missing or invalid 'secret' parameter")]
    InvalidSecret,

    /// The `algorithm` parameter names an unknown hash
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),

    /// A parameter failed to decode or parse
    #[error("invalid '{0}' parameter")]
    InvalidParameter(CompactString),
}

/// A configuration parsed from an `otpauth://` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Otp {
    /// Counter-based configuration
    Hotp(Hotp),
    /// Time-based configuration
    Totp(Totp),
}

impl fmt::Display for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotp(hotp) => fmt::Display::fmt(hotp, f),
            Self::Totp(totp) => fmt::Display::fmt(totp, f),
        }
    }
}

impl FromStr for Otp {
    type Err = UriError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        parse(uri)
    }
}

/// Parse an `otpauth://` URI into a [Hotp] or [Totp] configuration.
///
/// The scheme and type match case-insensitively. Query keys are
/// case-insensitive and the last occurrence of a repeated key wins. Fields
/// absent from the URI take the same defaults as direct construction.
pub fn parse(uri: &str) -> Result<Otp, UriError> {
    let (is_hotp, rest) = if let Some(rest) = strip_prefix_ignore_case(uri, "otpauth://hotp/") {
        (true, rest)
    } else if let Some(rest) = strip_prefix_ignore_case(uri, "otpauth://totp/") {
        (false, rest)
    } else {
        return Err(UriError::InvalidScheme);
    };

    let Some((raw_label, raw_query)) = rest.rsplit_once('?') else {
        return Err(UriError::InvalidScheme);
    };
    if raw_label.is_empty() || raw_query.is_empty() {
        return Err(UriError::InvalidScheme);
    }

    let mut params: HashMap<String, String> = HashMap::new();
    for pair in raw_query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(UriError::InvalidScheme);
        };
        if key.is_empty() {
            return Err(UriError::InvalidScheme);
        }
        let value = percent_decode(value, key)?;
        params.insert(key.to_ascii_lowercase(), value);
    }

    // An explicit issuer parameter wins over an "Issuer:label" prefix.
    let (prefix_issuer, raw_label) = split_label(raw_label);
    let label = percent_decode(raw_label, "label")?;
    let issuer = match params.remove("issuer") {
        Some(issuer) => issuer,
        None => match prefix_issuer {
            Some(prefix) => percent_decode(prefix, "issuer")?,
            None => String::new(),
        },
    };

    let secret = params
        .remove("secret")
        .and_then(|text| Secret::from_base32(&text).ok())
        .ok_or(UriError::InvalidSecret)?;

    let algorithm = match params.remove("algorithm") {
        Some(name) => name.parse::<Algorithm>()?,
        None => Algorithm::default(),
    };

    let digits = match params.remove("digits") {
        Some(text) => parse_integer::<u32>(&text, "digits", false)?,
        None => hotp::DEFAULT_DIGITS,
    };

    let parsed = if is_hotp {
        let counter = match params.remove("counter") {
            Some(text) => parse_integer::<u64>(&text, "counter", true)?,
            None => 0,
        };
        Otp::Hotp(Hotp {
            issuer: issuer.into(),
            label: label.into(),
            secret,
            algorithm,
            digits,
            counter,
        })
    } else {
        let period = match params.remove("period") {
            Some(text) => parse_integer::<u64>(&text, "period", false)?,
            None => totp::DEFAULT_PERIOD,
        };
        Otp::Totp(Totp {
            issuer: issuer.into(),
            label: label.into(),
            secret,
            algorithm,
            digits,
            period,
        })
    };

    tracing::debug!(uri = %parsed, "parsed otpauth uri");
    Ok(parsed)
}

/// Assemble the canonical URI text. The query order (issuer, secret,
/// algorithm, digits, counter|period) is a protocol contract; authenticator
/// apps compare these strings byte for byte.
#[allow(clippy::too_many_arguments)]
pub(crate) fn format_uri(
    kind: &str,
    issuer: &str,
    label: &str,
    secret: &Secret,
    algorithm: Algorithm,
    digits: u32,
    tail_key: &str,
    tail_value: u64,
) -> String {
    let head = if issuer.is_empty() {
        format!("{}?", urlencoding::encode(label))
    } else {
        format!(
            "{issuer}:{label}?issuer={issuer}&",
            issuer = urlencoding::encode(issuer),
            label = urlencoding::encode(label),
        )
    };
    format!(
        "otpauth://{kind}/{head}secret={secret}&algorithm={algorithm}&digits={digits}&{tail_key}={tail_value}",
        secret = secret.base32(),
    )
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Split a raw (still percent-encoded) label segment at the first `:` or
/// `%3A`, skipping literal spaces after the separator. No separator, or
/// nothing after it, means the whole segment is the label.
fn split_label(raw: &str) -> (Option<&str>, &str) {
    let colon = raw.find(':').map(|index| (index, 1));
    let encoded = find_ignore_case(raw, "%3a").map(|index| (index, 3));
    let Some((index, len)) = [colon, encoded]
        .into_iter()
        .flatten()
        .min_by_key(|(index, _)| *index)
    else {
        return (None, raw);
    };

    let rest = raw[index + len..].trim_start_matches(' ');
    if rest.is_empty() {
        return (None, raw);
    }
    (Some(&raw[..index]), rest)
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn percent_decode(text: &str, name: &str) -> Result<String, UriError> {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .map_err(|_| UriError::InvalidParameter(name.into()))
}

fn parse_integer<T: FromStr>(text: &str, name: &str, zero_ok: bool) -> Result<T, UriError>
where
    T: PartialEq + From<u8>,
{
    let invalid = || UriError::InvalidParameter(name.into());
    let value = text.parse::<T>().map_err(|_| invalid())?;
    if !zero_ok && value == T::from(0u8) {
        return Err(invalid());
    }
    Ok(value)
}
