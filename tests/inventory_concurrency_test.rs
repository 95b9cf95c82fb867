mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use common::TestApp;
use futures::future::join_all;
use gudang_api::{
    auth::{permissions_for, AuthUser},
    errors::{RuleViolation, ServiceError},
    lifecycle::StatusChange,
    models::{ItemStatus, UserRole},
};
use serde_json::{json, Value};
use uuid::Uuid;

fn updated_at(item: &Value) -> DateTime<Utc> {
    item["updated_at"]
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| panic!("updated_at missing in {item}"))
}

// Several verifiers act on the same pending item at once; the conditional
// status write lets exactly one of them through.
#[tokio::test]
async fn only_one_concurrent_verification_wins() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.staff.token, "Kontaktor 3P", 2).await;
    let id = item["id"].as_str().unwrap().to_string();

    let attempts = (0..8).map(|n| {
        let (uri, body, token) = if n % 2 == 0 {
            (format!("/api/v1/items/{id}/approve"), None, &app.verifier.token)
        } else {
            (
                format!("/api/v1/items/{id}/reject"),
                Some(json!({ "note": format!("percobaan {n}") })),
                &app.admin.token,
            )
        };
        let app = &app;
        async move { app.call(Method::POST, &uri, body, token).await }
    });
    let results = join_all(attempts).await;

    let winners = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    assert_eq!(winners, 1, "{results:?}");

    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::OK) {
        assert_eq!(*status, StatusCode::CONFLICT);
        let code = body["code"].as_str().unwrap();
        assert!(
            code == "ITEM_NOT_PENDING" || code == "ITEM_CONCURRENT_VERIFICATION",
            "unexpected code {code}"
        );
    }

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/items/{id}"), None, &app.admin.token)
        .await;
    assert_ne!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn edit_racing_a_verification_never_reopens_the_item() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.staff.token, "Klem Kabel", 9).await;
    let id = item["id"].as_str().unwrap().to_string();

    let approve_uri = format!("/api/v1/items/{id}/approve");
    let edit_uri = format!("/api/v1/items/{id}");
    let (approved, edited) = tokio::join!(
        app.call(Method::POST, &approve_uri, None, &app.verifier.token),
        app.call(
            Method::PATCH,
            &edit_uri,
            Some(json!({ "quantity": 3 })),
            &app.staff.token
        ),
    );

    let (_, body) = app.call(Method::GET, &edit_uri, None, &app.admin.token).await;
    let stored = &body["data"];
    match (approved.0, edited.0) {
        // edit first, then a verification that read the edited row
        (StatusCode::OK, StatusCode::OK) => {
            assert_eq!(stored["status"], "approved");
            assert_eq!(stored["quantity"], 3);
            assert!(updated_at(stored) > updated_at(&edited.1["data"]));
        }
        // verification first; the staff edit finds the item locked
        (StatusCode::OK, StatusCode::FORBIDDEN) => {
            assert_eq!(edited.1["code"], "ITEM_LOCKED");
            assert_eq!(stored["status"], "approved");
            assert_eq!(stored["quantity"], 9);
        }
        // the edit landed between the verifier's read and write
        (StatusCode::CONFLICT, StatusCode::OK) => {
            assert_eq!(approved.1["code"], "ITEM_CONCURRENT_VERIFICATION");
            assert_eq!(stored["status"], "pending");
            assert_eq!(stored["quantity"], 3);
        }
        other => panic!("unexpected outcome {other:?}: {} / {}", approved.1, edited.1),
    }
}

// A decision computed from a copy read before an admin correction must not
// overwrite the correction's timestamp.
#[tokio::test]
async fn verification_from_a_stale_read_conflicts() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.staff.token, "Arrester", 4).await;
    let id: Uuid = item["id"].as_str().unwrap().parse().unwrap();
    let uri = format!("/api/v1/items/{id}");
    let inventory = &app.state.services.inventory;

    let stale = inventory.find(id).await.unwrap();

    let (status, edited) = app
        .call(Method::PATCH, &uri, Some(json!({ "quantity": 5 })), &app.admin.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{edited}");

    let verifier = AuthUser {
        user_id: app.verifier.id,
        name: "Sari Verifikator".into(),
        email: app.verifier.email.clone(),
        role: UserRole::Verifikator,
        permissions: permissions_for(UserRole::Verifikator),
        token_id: "stale-read".into(),
    };
    let approve = StatusChange {
        target: ItemStatus::Approved,
        note: None,
    };
    let err = inventory
        .apply_status_change(&stale, approve, &verifier)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::Rule(RuleViolation::ConcurrentVerification)),
        "{err:?}"
    );

    let (_, body) = app.call(Method::GET, &uri, None, &app.admin.token).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(updated_at(&body["data"]), updated_at(&edited["data"]));

    let (status, body) = app
        .call(Method::POST, &format!("{uri}/approve"), None, &app.verifier.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(updated_at(&body["data"]) > updated_at(&edited["data"]));
}

#[tokio::test]
async fn concurrent_adds_of_one_material_code_all_succeed() {
    let app = TestApp::new().await;
    let names: Vec<String> = (0..6).map(|n| format!("Konektor Uji {n}")).collect();

    let adds = names.iter().enumerate().map(|(n, name)| {
        let token = if n % 2 == 0 {
            &app.staff.token
        } else {
            &app.admin.token
        };
        let app = &app;
        let payload = json!({ "code": "UJI-SERENTAK", "name": name, "unit": "SET" });
        async move {
            app.call(Method::POST, "/api/v1/materials", Some(payload), token)
                .await
        }
    });
    for (status, body) in join_all(adds).await {
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app
        .call(
            Method::GET,
            "/api/v1/materials?search=UJI-SERENTAK",
            None,
            &app.staff.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1, "{body}");
    let kept = entries[0]["name"].as_str().unwrap();
    assert!(names.iter().any(|n| n == kept), "unexpected name {kept}");
}
