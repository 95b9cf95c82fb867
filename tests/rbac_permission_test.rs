mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rstest::rstest;
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug)]
enum As {
    Staff,
    Verifier,
    Admin,
}

fn token(app: &TestApp, who: As) -> &str {
    match who {
        As::Staff => &app.staff.token,
        As::Verifier => &app.verifier.token,
        As::Admin => &app.admin.token,
    }
}

/// Checks only whether the permission gate let the request through.
fn passed_gate(status: StatusCode, body: &Value) -> bool {
    !(status == StatusCode::FORBIDDEN && body["error"]["code"] == "AUTH_INSUFFICIENT_PERMISSIONS")
}

#[rstest]
#[case::staff_lists_users(As::Staff, Method::GET, "/api/v1/users", false)]
#[case::verifier_lists_users(As::Verifier, Method::GET, "/api/v1/users", false)]
#[case::admin_lists_users(As::Admin, Method::GET, "/api/v1/users", true)]
#[case::staff_reads_reports(As::Staff, Method::GET, "/api/v1/reports/summary", false)]
#[case::verifier_reads_reports(As::Verifier, Method::GET, "/api/v1/reports/summary", true)]
#[case::admin_reads_reports(As::Admin, Method::GET, "/api/v1/reports/summary", true)]
#[case::staff_reads_catalog(As::Staff, Method::GET, "/api/v1/materials", true)]
#[case::staff_reads_notifications(As::Staff, Method::GET, "/api/v1/notifications", true)]
#[tokio::test]
async fn read_routes_follow_role_permissions(
    #[case] who: As,
    #[case] method: Method,
    #[case] uri: &str,
    #[case] allowed: bool,
) {
    let app = TestApp::new().await;
    let (status, body) = app.call(method, uri, None, token(&app, who)).await;
    assert_eq!(passed_gate(status, &body), allowed, "{who:?} {uri}: {status} {body}");
    if allowed {
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

#[rstest]
#[case::staff(As::Staff, false)]
#[case::verifier(As::Verifier, false)]
#[case::admin(As::Admin, true)]
#[tokio::test]
async fn only_admin_sends_notifications(#[case] who: As, #[case] allowed: bool) {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/notifications",
            Some(json!({ "title": "Stok opname", "message": "Jumat pukul 08.00" })),
            token(&app, who),
        )
        .await;
    if allowed {
        assert_eq!(status, StatusCode::CREATED, "{body}");
    } else {
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "AUTH_INSUFFICIENT_PERMISSIONS");
    }
}

#[tokio::test]
async fn staff_cannot_verify_items() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.staff.token, "Kontaktor", 2).await;
    let id = item["id"].as_str().unwrap();

    for action in ["approve", "reject"] {
        let (status, body) = app
            .call(
                Method::POST,
                &format!("/api/v1/items/{id}/{action}"),
                Some(json!({ "note": "tidak boleh" })),
                &app.staff.token,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{action}");
        assert_eq!(body["error"]["code"], "AUTH_INSUFFICIENT_PERMISSIONS");
    }

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/items/{id}"), None, &app.staff.token)
        .await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn staff_cannot_read_items_of_others() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.verifier.token, "Terminal", 1).await;
    let uri = format!("/api/v1/items/{}", item["id"].as_str().unwrap());

    let (status, body) = app.call(Method::GET, &uri, None, &app.staff.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.call(Method::GET, &uri, None, &app.admin.token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_change_applies_to_next_request() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(Method::GET, "/api/v1/reports/summary", None, &app.staff.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.call(
        Method::PUT,
        &format!("/api/v1/users/{}", app.staff.id),
        Some(json!({ "role": "verifikator" })),
        &app.admin.token,
    )
    .await;

    // permissions are resolved from the stored role on every request
    let (status, body) = app
        .call(Method::GET, "/api/v1/reports/summary", None, &app.staff.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
