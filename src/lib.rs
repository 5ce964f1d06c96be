#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!("../README.md")]

/// Hash algorithms available for code generation
pub mod algorithm;

/// HOTP (HMAC-based One-Time Password) generation and validation
pub mod hotp;

/// Secret key material and its text encodings
pub mod secret;

/// TOTP (Time-based One-Time Password) generation and validation
pub mod totp;

/// `otpauth://` URI parsing and formatting
pub mod uri;
