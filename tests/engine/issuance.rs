//! Support code issuance, expiry and revocation

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::collections::HashSet;
use std::sync::Arc;

// ============ Issuance ============

#[test]
fn test_issue_code_round_trips_customer_metadata() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    assert_eq!(issued.code.len(), 6, "support code should be six characters");
    assert!(
        issued.code.bytes().all(|b| b.is_ascii_digit()),
        "support code should be all digits, got {}",
        issued.code
    );
    assert_eq!(issued.status, CodeStatus::Active);
    assert_eq!(
        issued.expires_at - issued.created_at,
        ONE_DAY,
        "codes should expire 24h after issuance"
    );

    let validated = env.engine().validate(&issued.code).unwrap();
    assert_eq!(
        validated.support_code().customer_name,
        "Jane Doe",
        "gate should return the stored customer name"
    );
    assert_eq!(validated.support_code().metadata(), jane_doe());
}

#[test]
fn test_issue_code_requires_customer_name() {
    let env = test_env();
    let err = env
        .engine()
        .issue_code(&CustomerMetadata::named("   "))
        .unwrap_err();

    assert!(
        matches!(err, AppError::Validation(_)),
        "blank name should be a validation error, got {err:?}"
    );

    let conn = env.conn();
    let (_, total) = queries::list_support_codes_paginated(&conn, 10, 0).unwrap();
    assert_eq!(total, 0, "nothing should be persisted for an invalid request");
}

#[test]
fn test_issue_code_does_not_build_a_package() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    assert_eq!(env.packager.calls(), 0, "issuing must not invoke the packager");
    let conn = env.conn();
    assert!(queries::list_packages_for_code(&conn, &issued.code).unwrap().is_empty());
}

#[test]
fn test_issue_code_redraws_on_live_collision() {
    let env = test_env_with(TestOptions {
        random: Some(Arc::new(SequenceRandom::codes(&["111111", "111111", "222222"]))),
        ..Default::default()
    });

    let first = env.engine().issue_code(&jane_doe()).unwrap();
    let second = env.engine().issue_code(&CustomerMetadata::named("Bob")).unwrap();

    assert_eq!(first.code, "111111");
    assert_eq!(
        second.code, "222222",
        "a code held by a live row must be redrawn"
    );
}

#[test]
fn test_expired_code_value_can_be_reissued() {
    let env = test_env_with(TestOptions {
        random: Some(Arc::new(SequenceRandom::codes(&["333333", "333333"]))),
        ..Default::default()
    });
    let t0 = now() - 3 * ONE_DAY;

    let old = env.engine().issue_code_at(&jane_doe(), t0).unwrap();
    let new = env
        .engine()
        .issue_code_at(&CustomerMetadata::named("Bob"), t0 + 2 * ONE_DAY)
        .unwrap();

    assert_eq!(old.code, new.code, "expired codes free their value");
    assert_ne!(old.id, new.id, "reissue creates a new row");
}

#[test]
fn test_concurrent_issuance_yields_unique_live_codes() {
    let env = test_env();
    let engine = Arc::clone(env.engine());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine
                    .issue_code(&CustomerMetadata::named(&format!("Customer {i}")))
                    .unwrap()
                    .code
            })
        })
        .collect();

    let codes: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(codes.len(), 16, "every concurrent issuance must get its own code");
}

// ============ Expiry ============

#[test]
fn test_code_expires_exactly_at_expires_at() {
    let env = test_env();
    let t0 = now();
    let issued = env.engine().issue_code_at(&jane_doe(), t0).unwrap();
    let expires_at = issued.expires_at;

    assert!(
        env.engine().validate_at(&issued.code, expires_at - 1).is_ok(),
        "code should be valid one second before expiry"
    );
    assert!(matches!(
        env.engine().validate_at(&issued.code, expires_at),
        Err(AppError::InvalidOrExpiredCode)
    ));
    assert!(matches!(
        env.engine().validate_at(&issued.code, expires_at + 1),
        Err(AppError::InvalidOrExpiredCode)
    ));
}

#[test]
fn test_unknown_code_is_invalid() {
    let env = test_env();
    assert!(matches!(
        env.engine().validate("999999"),
        Err(AppError::InvalidOrExpiredCode)
    ));
}

#[test]
fn test_malformed_code_rejected_without_store_access() {
    let engine = unreachable_store_engine();

    for raw in ["", "12345", "1234567", "12a456", "abcdef", "12 456"] {
        assert!(
            matches!(engine.validate(raw), Err(AppError::MalformedCode)),
            "{raw:?} should be rejected as malformed"
        );
    }

    assert!(
        matches!(engine.validate("123456"), Err(AppError::StoreUnavailable(_))),
        "well-formed codes do reach the (unreachable) store"
    );
}

// ============ Revocation ============

#[test]
fn test_revoked_code_fails_the_gate() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    assert_eq!(env.engine().revoke_code(&issued.code).unwrap(), 1);
    assert!(matches!(
        env.engine().validate(&issued.code),
        Err(AppError::InvalidOrExpiredCode)
    ));

    let conn = env.conn();
    let row = queries::get_support_code_by_id(&conn, &issued.id).unwrap().unwrap();
    assert_eq!(row.status, CodeStatus::Inactive);
}

#[test]
fn test_revoke_unknown_or_malformed_code() {
    let env = test_env();
    assert!(matches!(
        env.engine().revoke_code("123456"),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        env.engine().revoke_code("12-456"),
        Err(AppError::MalformedCode)
    ));
}
