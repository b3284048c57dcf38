//! Admin API endpoints and static-key auth

#[path = "../common/mod.rs"]
mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

const ADMIN_KEY: &str = "test-admin-key";

// ============ Auth ============

#[tokio::test]
async fn test_admin_routes_require_key_when_configured() {
    let env = test_env().with_admin_key(ADMIN_KEY);

    let (status, body) = send(env.app(), get_request("/api/stats")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "missing key");
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(env.app(), with_bearer(get_request("/api/stats"), "wrong-key")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "wrong key");

    let (status, _) = send(env.app(), with_bearer(get_request("/api/stats"), ADMIN_KEY)).await;
    assert_eq!(status, StatusCode::OK, "correct key");
}

#[tokio::test]
async fn test_customer_routes_ignore_admin_key() {
    let env = test_env().with_admin_key(ADMIN_KEY);
    let (status, _) = send(env.app(), get_request("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_open_without_configured_key() {
    let env = test_env();
    let (status, _) = send(env.app(), get_request("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
}

// ============ Support codes ============

#[tokio::test]
async fn test_create_support_code_builds_package_eagerly() {
    let env = test_env().with_admin_key(ADMIN_KEY);

    let (status, body) = send(
        env.app(),
        with_bearer(
            json_request(
                "POST",
                "/api/support-codes",
                json!({"customer_name": "  Jane Doe ", "customer_email": "jane@example.com", "customer_phone": ""}),
            ),
            ADMIN_KEY,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    assert_eq!(body["success"], true);
    let code = body["support_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(body["customer_data"]["customer_name"], "Jane Doe");
    assert!(body["customer_data"]["customer_phone"].is_null(), "blank fields are dropped");
    assert_eq!(
        body["download_url"],
        format!("/downloads/ConnectAssist-{code}-JaneDoe.zip")
    );
    assert!(body.get("package_error").is_none());
    assert_eq!(env.packager.calls(), 1);
}

#[tokio::test]
async fn test_create_support_code_keeps_code_when_packaging_fails() {
    let env = test_env();
    env.packager.set_failing(true);

    let (status, body) = send(
        env.app(),
        json_request("POST", "/api/support-codes", json!({"customer_name": "Jane Doe"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["package_error"].is_string(), "failure should be reported: {body}");
    assert!(body.get("download_url").is_none());

    let code = body["support_code"].as_str().unwrap();
    assert!(
        env.engine().validate(code).is_ok(),
        "issued code must survive a packaging failure"
    );
}

#[tokio::test]
async fn test_create_support_code_requires_name() {
    let env = test_env();
    let (status, body) = send(
        env.app(),
        json_request("POST", "/api/support-codes", json!({"customer_email": "x@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Customer name is required");
}

#[tokio::test]
async fn test_list_support_codes_paginates() {
    let env = test_env();
    for name in ["A", "B", "C"] {
        env.engine().issue_code(&CustomerMetadata::named(name)).unwrap();
    }

    let (status, body) = send(env.app(), get_request("/api/support-codes?limit=2&offset=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["is_valid"], true);
    assert!(body["items"][0]["code"].is_string());
}

#[tokio::test]
async fn test_revoke_blocks_redemption() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();

    let (status, body) = send(
        env.app(),
        json_request(
            "POST",
            &format!("/api/support-codes/{}/revoke", issued.code),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], 1);

    let (status, body) = send(
        env.app(),
        json_request("POST", "/api/customer/installer", json!({"support_code": issued.code})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired support code");

    let (status, _) = send(
        env.app(),
        json_request(
            "POST",
            &format!("/api/support-codes/{}/revoke", issued.code),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "nothing left to revoke");
}

// ============ Devices and connections ============

#[tokio::test]
async fn test_connect_flow() {
    let env = test_env();
    let issued = env.engine().issue_code(&jane_doe()).unwrap();
    let device = env
        .engine()
        .register_heartbeat(DeviceHeartbeat {
            device_name: "JANE-LAPTOP".to_string(),
            support_code: Some(issued.code.clone()),
            ..Default::default()
        })
        .unwrap();

    let (status, body) = send(
        env.app(),
        json_request("POST", "/api/connect", json!({"device_id": device.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "connect failed: {body}");
    let info = &body["connection_info"];
    assert_eq!(info["password"], format!("CA{}!", issued.code));
    assert_eq!(info["server"], TEST_DOMAIN);
    assert_eq!(info["connection_type"], "desktop");

    let (_, stats) = send(env.app(), get_request("/api/stats")).await;
    assert_eq!(stats["active_sessions"], 1);
    assert_eq!(stats["online_devices"], 1);

    let connection_id = info["connection_id"].as_str().unwrap();
    let (status, ended) = send(
        env.app(),
        json_request(
            "POST",
            &format!("/api/connections/{connection_id}/end"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["status"], "ended");
}

#[tokio::test]
async fn test_connect_offline_device_is_rejected() {
    let env = test_env();
    {
        let conn = env.conn();
        insert_test_device(&conn, "sleepy", Some("123456"), now() - 3_600);
    }

    let (status, body) = send(
        env.app(),
        json_request("POST", "/api/connect", json!({"device_id": "sleepy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Device is not online");
}

#[tokio::test]
async fn test_device_listing_and_lookup() {
    let env = test_env();
    {
        let conn = env.conn();
        insert_test_device(&conn, "dev-a", None, now());
    }

    let (status, body) = send(env.app(), get_request("/api/devices")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "dev-a");
    assert_eq!(body[0]["status"], "online");

    let (status, _) = send(env.app(), get_request("/api/devices/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activity_feed() {
    let env = test_env();
    env.engine().issue_code(&jane_doe()).unwrap();

    let (status, body) = send(env.app(), get_request("/api/activity")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["type"], "code_generated");
}
