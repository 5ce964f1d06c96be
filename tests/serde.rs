//! Serialized configurations carry secrets as Base32 text and fill missing
//! fields with construction defaults.

use otpauth::algorithm::Algorithm;
use otpauth::hotp::Hotp;
use otpauth::secret::Secret;
use otpauth::totp::Totp;

#[test]
fn secret_serializes_as_base32_text() {
    let secret = Secret::new(b"12345678901234567890");
    let json = serde_json::to_string(&secret).unwrap();
    assert_eq!(json, "\"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ\"");

    let back: Secret = serde_json::from_str(&json).unwrap();
    assert_eq!(back, secret);
}

#[test]
fn invalid_base32_fails_deserialization() {
    assert!(serde_json::from_str::<Secret>("\"not base32!\"").is_err());
}

#[test]
fn hotp_round_trips_through_json() {
    let hotp = Hotp::new(Secret::new(b"12345678901234567890"))
        .with_issuer("ACME")
        .with_label("alice")
        .with_algorithm(Algorithm::Sha3_256)
        .with_digits(8)
        .with_counter(42);

    let json = serde_json::to_string(&hotp).unwrap();
    assert!(json.contains("\"algorithm\":\"SHA3-256\""));

    let back: Hotp = serde_json::from_str(&json).unwrap();
    assert_eq!(back, hotp);
}

#[test]
fn missing_fields_take_construction_defaults() {
    let hotp: Hotp =
        serde_json::from_str("{\"secret\":\"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ\"}").unwrap();
    assert_eq!(hotp, Hotp::new(Secret::new(b"12345678901234567890")));
    assert_eq!(hotp.label, "OTPAuth");
    assert_eq!(hotp.algorithm, Algorithm::Sha1);
    assert_eq!(hotp.digits, 6);
    assert_eq!(hotp.counter, 0);

    let totp: Totp =
        serde_json::from_str("{\"secret\":\"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ\"}").unwrap();
    assert_eq!(totp.period, 30);
}

#[test]
fn totp_round_trips_through_json() {
    let totp = Totp::new(Secret::new(b"12345678901234567890"))
        .with_issuer("ACME Co")
        .with_period(60);

    let json = serde_json::to_string(&totp).unwrap();
    let back: Totp = serde_json::from_str(&json).unwrap();
    assert_eq!(back, totp);
}
