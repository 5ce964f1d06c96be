use std::borrow::Cow;

use fast32::base32;
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Default secret size in bytes (160 bits, per RFC 4226 §4)
pub const DEFAULT_SECRET_SIZE: usize = 20;

/// Error type for secret decoding and generation
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Input is not valid RFC 4648 Base32
    #[error("invalid base32 input: {0}")]
    Base32(#[from] fast32::DecodeError),

    /// Input is not a valid sequence of hex digit pairs
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The operating system's secure random source is unavailable
    #[error("secure random source unavailable")]
    SourceUnavailable,
}

/// OTP secret key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret(Box<[u8]>);

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Secret {
    /// Create a secret from a byte array
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// Generate a random secret of [DEFAULT_SECRET_SIZE] bytes
    pub fn random() -> Result<Self, SecretError> {
        Self::random_sized(DEFAULT_SECRET_SIZE)
    }

    /// Generate a random secret of `size` bytes from the OS random source
    pub fn random_sized(size: usize) -> Result<Self, SecretError> {
        let mut bytes = vec![0u8; size];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| SecretError::SourceUnavailable)?;
        Ok(Self(bytes.into_boxed_slice()))
    }

    /// Create a secret from a Latin-1 string.
    ///
    /// Each code point is truncated to its low byte, so code points above
    /// U+00FF lose information.
    pub fn from_latin1(text: impl AsRef<str>) -> Self {
        let bytes: Vec<u8> = text
            .as_ref()
            .chars()
            .map(|c| (c as u32 & 0xff) as u8)
            .collect();
        Self(bytes.into_boxed_slice())
    }

    /// Create a secret from a UTF-8 string
    pub fn from_utf8(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().as_bytes().into())
    }

    /// Create a secret from a Base32 encoded string.
    ///
    /// Input is case-insensitive and trailing padding is ignored.
    pub fn from_base32(text: impl AsRef<str>) -> Result<Self, SecretError> {
        let unpadded = text.as_ref().trim_end_matches('=').to_ascii_uppercase();
        let bytes = base32::RFC4648_NOPAD.decode_str(&unpadded)?;
        Ok(Self(bytes.into_boxed_slice()))
    }

    /// Create a secret from a hex encoded string, case-insensitive
    pub fn from_hex(text: impl AsRef<str>) -> Result<Self, SecretError> {
        let bytes = hex::decode(text.as_ref())?;
        Ok(Self(bytes.into_boxed_slice()))
    }

    /// The raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Secret length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Latin-1 view: one code point in U+0000..=U+00FF per byte
    pub fn latin1(&self) -> String {
        self.0.iter().map(|&b| char::from(b)).collect()
    }

    /// UTF-8 view; invalid sequences become the replacement character
    pub fn utf8(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// RFC 4648 Base32 view, uppercase, unpadded
    pub fn base32(&self) -> String {
        base32::RFC4648_NOPAD.encode(&self.0)
    }

    /// Uppercase hex view, two digits per byte
    pub fn hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.base32())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::from_base32(&text).map_err(serde::de::Error::custom)
    }
}
