use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

/// Error returned when a hash algorithm name is not in the supported set
#[derive(Debug, thiserror::Error)]
#[error("unsupported algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub CompactString);

/// Hash algorithms usable for HMAC-based code generation.
///
/// Names are accepted case-insensitively and rendered in their canonical
/// uppercase form (`SHA1`, `SHA3-256`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC-SHA-1 (RFC 4226 default)
    #[default]
    #[serde(rename = "SHA1")]
    Sha1,
    /// HMAC-SHA-224
    #[serde(rename = "SHA224")]
    Sha224,
    /// HMAC-SHA-256
    #[serde(rename = "SHA256")]
    Sha256,
    /// HMAC-SHA-384
    #[serde(rename = "SHA384")]
    Sha384,
    /// HMAC-SHA-512
    #[serde(rename = "SHA512")]
    Sha512,
    /// HMAC-SHA3-224
    #[serde(rename = "SHA3-224")]
    Sha3_224,
    /// HMAC-SHA3-256
    #[serde(rename = "SHA3-256")]
    Sha3_256,
    /// HMAC-SHA3-384
    #[serde(rename = "SHA3-384")]
    Sha3_384,
    /// HMAC-SHA3-512
    #[serde(rename = "SHA3-512")]
    Sha3_512,
}

impl Algorithm {
    /// Canonical uppercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
            Self::Sha3_224 => "SHA3-224",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_384 => "SHA3-384",
            Self::Sha3_512 => "SHA3-512",
        }
    }

    /// Compute the keyed hash of `message` under `key`
    pub fn sign(self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => sign::<Hmac<Sha1>>(key, message),
            Self::Sha224 => sign::<Hmac<Sha224>>(key, message),
            Self::Sha256 => sign::<Hmac<Sha256>>(key, message),
            Self::Sha384 => sign::<Hmac<Sha384>>(key, message),
            Self::Sha512 => sign::<Hmac<Sha512>>(key, message),
            Self::Sha3_224 => sign::<Hmac<Sha3_224>>(key, message),
            Self::Sha3_256 => sign::<Hmac<Sha3_256>>(key, message),
            Self::Sha3_384 => sign::<Hmac<Sha3_384>>(key, message),
            Self::Sha3_512 => sign::<Hmac<Sha3_512>>(key, message),
        }
    }
}

fn sign<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    // SAFE: HMAC accepts keys of any length.
    #[allow(clippy::unwrap_used)]
    let mut mac = <M as Mac>::new_from_slice(key).unwrap();
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "SHA3-224" => Ok(Self::Sha3_224),
            "SHA3-256" => Ok(Self::Sha3_256),
            "SHA3-384" => Ok(Self::Sha3_384),
            "SHA3-512" => Ok(Self::Sha3_512),
            _ => Err(UnsupportedAlgorithm(name.into())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("sha1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("Sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha3-384".parse::<Algorithm>().unwrap(), Algorithm::Sha3_384);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!("MD5".parse::<Algorithm>().is_err());
        assert!("SHA3".parse::<Algorithm>().is_err());
        assert!("".parse::<Algorithm>().is_err());
    }

    #[test]
    fn display_is_canonical_uppercase() {
        assert_eq!(Algorithm::Sha1.to_string(), "SHA1");
        assert_eq!(Algorithm::Sha3_224.to_string(), "SHA3-224");
    }

    #[test]
    fn sign_emits_digest_sized_output() {
        let key = b"key";
        assert_eq!(Algorithm::Sha1.sign(key, b"msg").len(), 20);
        assert_eq!(Algorithm::Sha224.sign(key, b"msg").len(), 28);
        assert_eq!(Algorithm::Sha512.sign(key, b"msg").len(), 64);
        assert_eq!(Algorithm::Sha3_256.sign(key, b"msg").len(), 32);
    }

    #[test]
    fn rfc2202_hmac_sha1_vector() {
        // RFC 2202 test case 2: key "Jefe", data "what do ya want for nothing?"
        let mac = Algorithm::Sha1.sign(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }
}
