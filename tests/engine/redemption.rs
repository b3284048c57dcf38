//! Redemption: package cache hits, misses, rebuilds and failure atomicity

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

// ============ Cache behavior ============

#[tokio::test]
async fn test_first_redeem_builds_second_is_cache_hit() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    let first = env.engine().redeem(&issued.code).await.unwrap();
    assert!(!first.cache_hit, "first redemption should build");
    assert_eq!(env.packager.calls(), 1);
    assert_eq!(first.package.customer_name, "Jane Doe");
    assert_eq!(first.package.support_code, issued.code);
    assert_eq!(
        first.package.download_url(),
        format!("/downloads/ConnectAssist-{}-JaneDoe.zip", issued.code)
    );

    let second = env.engine().redeem(&issued.code).await.unwrap();
    assert!(second.cache_hit, "second redemption should reuse the artifact");
    assert_eq!(env.packager.calls(), 1, "packager must not run on a cache hit");
    assert_eq!(second.package.id, first.package.id);

    let conn = env.conn();
    assert_eq!(
        queries::list_packages_for_code(&conn, &issued.code).unwrap().len(),
        1,
        "a cache hit must not write a package row"
    );
}

#[tokio::test]
async fn test_deleted_artifact_is_rebuilt_with_new_row() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    let first = env.engine().redeem(&issued.code).await.unwrap();
    fs::remove_file(&first.package.package_path).unwrap();

    let second = env.engine().redeem(&issued.code).await.unwrap();
    assert!(!second.cache_hit, "missing artifact is a cache miss");
    assert_eq!(env.packager.calls(), 2);
    assert_ne!(second.package.id, first.package.id);

    let conn = env.conn();
    let packages = queries::list_packages_for_code(&conn, &issued.code).unwrap();
    assert_eq!(packages.len(), 2, "rebuild appends a row, history is kept");
    assert_eq!(packages[0].id, second.package.id, "newest row first");
}

#[tokio::test]
async fn test_empty_artifact_is_rebuilt() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    let first = env.engine().redeem(&issued.code).await.unwrap();
    fs::write(&first.package.package_path, b"").unwrap();

    let second = env.engine().redeem(&issued.code).await.unwrap();
    assert!(!second.cache_hit, "zero-byte artifact must not count as a hit");
    assert_eq!(env.packager.calls(), 2);
    assert!(fs::metadata(&second.package.package_path).unwrap().len() > 0);
}

#[tokio::test]
async fn test_reissued_code_value_never_serves_previous_customer_package() {
    let env = test_env_with(TestOptions {
        random: Some(Arc::new(SequenceRandom::codes(&["444444", "444444"]))),
        ..Default::default()
    });
    let t0 = now() - 2 * ONE_DAY;

    // Old row: issued and redeemed while it was still valid
    let old = env.engine().issue_code_at(&jane_doe(), t0).unwrap();
    let validated = env.engine().validate_at(&old.code, t0 + 60).unwrap();
    let old_outcome = env.engine().redeem_code(validated).await.unwrap();

    let new = env.engine().issue_code(&CustomerMetadata::named("Bob Smith")).unwrap();
    assert_eq!(new.code, old.code);

    let outcome = env.engine().redeem(&new.code).await.unwrap();
    assert!(!outcome.cache_hit, "a new row for the same value starts with no package");
    assert_ne!(outcome.package.id, old_outcome.package.id);
    assert_eq!(outcome.package.customer_name, "Bob Smith");
}

#[tokio::test]
async fn test_track_download_on_reissued_value_leaves_previous_customer_package() {
    let env = test_env_with(TestOptions {
        random: Some(Arc::new(SequenceRandom::codes(&["444444", "444444"]))),
        ..Default::default()
    });
    let t0 = now() - 2 * ONE_DAY;

    let old = env.engine().issue_code_at(&jane_doe(), t0).unwrap();
    let validated = env.engine().validate_at(&old.code, t0 + 60).unwrap();
    let old_outcome = env.engine().redeem_code(validated).await.unwrap();

    let new = env.engine().issue_code(&CustomerMetadata::named("Bob Smith")).unwrap();
    assert_eq!(new.code, old.code);

    // Bob has not redeemed yet, so there is nothing of his to stamp
    assert!(!env.engine().track_download(&new.code, Some(1_800_000_000)));
    {
        let conn = env.conn();
        let old_pkg = queries::get_latest_package_for_code_id(&conn, &old_outcome.support_code.id)
            .unwrap()
            .unwrap();
        assert_eq!(old_pkg.customer_name, "Jane Doe");
        assert_eq!(old_pkg.downloaded_at, None);
    }

    let outcome = env.engine().redeem(&new.code).await.unwrap();
    assert!(env.engine().track_download(&new.code, Some(1_800_000_000)));

    let conn = env.conn();
    let new_pkg = queries::get_latest_package_for_code_id(&conn, &outcome.support_code.id)
        .unwrap()
        .unwrap();
    assert_eq!(new_pkg.downloaded_at, Some(1_800_000_000));
    let old_pkg = queries::get_latest_package_for_code_id(&conn, &old_outcome.support_code.id)
        .unwrap()
        .unwrap();
    assert_eq!(old_pkg.downloaded_at, None);
}

// ============ Failure atomicity ============

#[tokio::test]
async fn test_failed_build_persists_nothing_and_next_redeem_retries() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();
    env.packager.set_failing(true);

    let err = env.engine().redeem(&issued.code).await.unwrap_err();
    assert!(
        matches!(err, AppError::Packager(PackagerError::Failed(_))),
        "build failure should surface as a packager error, got {err:?}"
    );
    {
        let conn = env.conn();
        assert!(
            queries::list_packages_for_code(&conn, &issued.code).unwrap().is_empty(),
            "failed build must not leave a package row"
        );
    }

    env.packager.set_failing(false);
    let outcome = env.engine().redeem(&issued.code).await.unwrap();
    assert!(!outcome.cache_hit);
    assert_eq!(env.packager.calls(), 2, "next redemption retries the build");
}

#[tokio::test]
async fn test_build_timeout_persists_nothing() {
    let env = test_env_with(TestOptions {
        packager_timeout: Duration::from_millis(50),
        ..Default::default()
    });
    let issued = env.engine().issue_code(&jane_doe()).unwrap();
    env.packager.set_delay(Some(Duration::from_millis(300)));

    let err = env.engine().redeem(&issued.code).await.unwrap_err();
    assert!(
        matches!(err, AppError::Packager(PackagerError::Timeout(_))),
        "slow build should time out, got {err:?}"
    );

    let conn = env.conn();
    assert!(queries::list_packages_for_code(&conn, &issued.code).unwrap().is_empty());
}

#[tokio::test]
async fn test_redeem_expired_or_malformed_code_never_builds() {
    let env = test_env();
    let issued = env.engine().issue_code_at(&jane_doe(), now() - 2 * ONE_DAY).unwrap();

    assert!(matches!(
        env.engine().redeem(&issued.code).await,
        Err(AppError::InvalidOrExpiredCode)
    ));
    assert!(matches!(
        env.engine().redeem("12345").await,
        Err(AppError::MalformedCode)
    ));
    assert_eq!(env.packager.calls(), 0);
}

// ============ Concurrency ============

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_redemptions_of_same_code_build_once() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();
    env.packager.set_delay(Some(Duration::from_millis(100)));

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let engine = Arc::clone(env.engine());
            let code = issued.code.clone();
            tokio::spawn(async move { engine.redeem(&code).await.unwrap() })
        })
        .collect();

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    assert_eq!(env.packager.calls(), 1, "same-code redemptions should share one build");
    assert_eq!(outcomes.iter().filter(|o| !o.cache_hit).count(), 1);
    let package_id = &outcomes[0].package.id;
    assert!(outcomes.iter().all(|o| &o.package.id == package_id));
}
