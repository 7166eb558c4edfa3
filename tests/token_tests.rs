use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use reset_requests::config::ResetSettings;
use reset_requests::token::{self, ResetToken, TokenHasher};
use reset_requests::ResetError;

// ── Hashing ─────────────────────────────────────────────────────

#[test]
fn hash_verifies_for_issuing_context() {
    let hasher = TokenHasher::new("secret");
    let user_id = Uuid::new_v4();
    let expires_at = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();

    let hashed = hasher.hash("verifier", user_id, expires_at);

    assert!(hasher.verify("verifier", user_id, expires_at, &hashed));
    assert!(!hasher.verify("verifieR", user_id, expires_at, &hashed));
}

#[test]
fn hash_is_bound_to_user_and_expiry() {
    let hasher = TokenHasher::new("secret");
    let user_id = Uuid::new_v4();
    let expires_at = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();

    let hashed = hasher.hash("verifier", user_id, expires_at);

    assert!(!hasher.verify("verifier", Uuid::new_v4(), expires_at, &hashed));
    assert!(!hasher.verify(
        "verifier",
        user_id,
        expires_at + Duration::hours(1),
        &hashed
    ));
}

#[test]
fn hash_depends_on_signing_key() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();

    let a = TokenHasher::new("key-one").hash("verifier", user_id, expires_at);
    let b = TokenHasher::new("key-two").hash("verifier", user_id, expires_at);

    assert_ne!(a, b);
    assert_eq!(
        a,
        TokenHasher::new("key-one").hash("verifier", user_id, expires_at)
    );
}

#[test]
fn verify_rejects_truncated_hash() {
    let hasher = TokenHasher::new("secret");
    let user_id = Uuid::new_v4();
    let expires_at = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();

    let hashed = hasher.hash("verifier", user_id, expires_at);

    assert!(!hasher.verify("verifier", user_id, expires_at, &hashed[..32]));
    assert!(!hasher.verify("verifier", user_id, expires_at, ""));
}

#[test]
fn hasher_debug_hides_key() {
    let printed = format!("{:?}", TokenHasher::new("super-secret"));
    assert!(!printed.contains("super-secret"));
}

// ── Token Strings ───────────────────────────────────────────────

#[test]
fn random_string_is_alphanumeric_of_requested_length() {
    let s = token::random_string(40);
    assert_eq!(s.len(), 40);
    assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(s, token::random_string(40));
}

#[test]
fn split_token_separates_selector_and_verifier() {
    let now = Utc::now();
    let issued = ResetToken::new("abcdefgh".into(), "12345678".into(), now, now);

    let combined = issued.token();
    assert_eq!(token::split_token(&combined, 8), Some(("abcdefgh", "12345678")));
}

#[test]
fn split_token_rejects_missing_verifier() {
    assert_eq!(token::split_token("abcdefgh", 8), None);
    assert_eq!(token::split_token("abc", 8), None);
    assert_eq!(token::split_token("", 8), None);
}

#[test]
fn split_token_rejects_non_char_boundary() {
    // 'é' is two bytes; byte 2 falls inside it.
    assert_eq!(token::split_token("aéxyz", 2), None);
}

// ── Settings ────────────────────────────────────────────────────

#[test]
fn default_settings_are_valid() {
    let settings = ResetSettings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.token_lifetime, Duration::hours(1));
    assert_eq!(settings.selector_length, 20);
    assert_eq!(settings.verifier_length, 20);
    assert!(settings.garbage_collect);
    assert_eq!(settings.request_throttle, None);
}

#[test]
fn settings_reject_non_positive_lifetime() {
    let settings = ResetSettings {
        token_lifetime: Duration::zero(),
        ..ResetSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn settings_reject_bad_lengths() {
    let short = ResetSettings {
        selector_length: 4,
        ..ResetSettings::default()
    };
    let long = ResetSettings {
        verifier_length: 65,
        ..ResetSettings::default()
    };

    assert!(short.validate().unwrap_err().contains("selector"));
    assert!(long.validate().unwrap_err().contains("verifier"));
}

#[test]
fn settings_reject_huge_lifetime_and_throttle() {
    let lifetime = ResetSettings {
        token_lifetime: Duration::days(365 * 300_000),
        ..ResetSettings::default()
    };
    let throttle = ResetSettings {
        request_throttle: Some(Duration::days(366)),
        ..ResetSettings::default()
    };
    let longest = ResetSettings {
        token_lifetime: Duration::days(365),
        request_throttle: Some(Duration::days(365)),
        ..ResetSettings::default()
    };

    assert!(lifetime.validate().unwrap_err().contains("lifetime"));
    assert!(throttle.validate().unwrap_err().contains("throttle"));
    assert!(longest.validate().is_ok());
}

// ── Errors ──────────────────────────────────────────────────────

#[test]
fn token_failures_share_one_public_message() {
    let failures = [
        ResetError::NotFound,
        ResetError::Expired,
        ResetError::InvalidToken,
    ];

    for err in &failures {
        assert!(err.is_token_failure());
        assert_eq!(err.public_message(), failures[0].public_message());
    }

    // Internally they remain distinguishable.
    assert_ne!(failures[0].to_string(), failures[1].to_string());
    assert_ne!(failures[1].to_string(), failures[2].to_string());
}

#[test]
fn storage_errors_are_not_token_failures() {
    let err = ResetError::Storage("connection refused".into());
    assert!(!err.is_token_failure());
    assert!(!err.public_message().contains("connection refused"));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn throttle_message_names_availability() {
    let available_at = Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap();
    let err = ResetError::TooManyRequests { available_at };

    assert!(!err.is_token_failure());
    assert!(err.public_message().contains("2026-05-01 09:30 UTC"));
}
