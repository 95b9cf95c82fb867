mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

async fn decide(app: &TestApp, id: &str, approve: bool) {
    let (action, body) = if approve {
        ("approve", None)
    } else {
        ("reject", Some(json!({ "note": "segel rusak" })))
    };
    let (status, response) = app
        .call(
            Method::POST,
            &format!("/api/v1/items/{id}/{action}"),
            body,
            &app.verifier.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{response}");
}

#[tokio::test]
async fn summary_counts_statuses_and_low_stock() {
    let app = TestApp::new().await;
    let a = app.submit_material(&app.staff.token, "MCB 1P 6A", 4).await;
    let b = app.submit_material(&app.staff.token, "MCB 1P 10A", 25).await;
    let c = app.submit_material(&app.staff.token, "Fuse", 3).await;
    app.submit_material(&app.staff.token, "Isolator", 12).await;

    decide(&app, a["id"].as_str().unwrap(), true).await;
    decide(&app, b["id"].as_str().unwrap(), true).await;
    decide(&app, c["id"].as_str().unwrap(), false).await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/reports/summary", None, &app.admin.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let summary = &body["data"];
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["approved"], 2);
    assert_eq!(summary["rejected"], 1);
    assert_eq!(summary["pending"], 1);
    assert_eq!(summary["andal"], 4);
    assert_eq!(summary["limbah"], 0);
    assert_eq!(summary["created_today"], 4);
    assert_eq!(summary["active_users"], 3);
    assert_eq!(summary["approval_rate"], 50);
    assert_eq!(summary["approval_label"], "Cukup Baik");
    assert_eq!(summary["categories"], json!([{ "category": "MCB", "count": 4 }]));

    let mut low: Vec<&str> = summary["low_stock"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    low.sort();
    assert_eq!(low, vec!["Fuse", "MCB 1P 6A"]);
}

#[tokio::test]
async fn summary_honours_status_filter() {
    let app = TestApp::new().await;
    let a = app.submit_material(&app.staff.token, "Kabel Twist", 5).await;
    app.submit_material(&app.staff.token, "Klem", 5).await;
    decide(&app, a["id"].as_str().unwrap(), true).await;

    let (_, body) = app
        .call(
            Method::GET,
            "/api/v1/reports/summary?status=approved",
            None,
            &app.verifier.token,
        )
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["approval_rate"], 100);
    assert_eq!(body["data"]["approval_label"], "Sangat Baik");

    let (status, _) = app
        .call(
            Method::GET,
            "/api/v1/reports/summary?status=archived",
            None,
            &app.verifier.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_lists_rows_in_column_order() {
    let app = TestApp::new().await;
    let item = app.submit_material(&app.staff.token, "Konektor", 7).await;
    decide(&app, item["id"].as_str().unwrap(), false).await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/reports/export", None, &app.admin.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let report = &body["data"];

    let header = report["header"].as_array().unwrap();
    assert!(header
        .last()
        .and_then(|h| h.as_str())
        .is_some_and(|h| h.starts_with("Dicetak pada: ")));
    assert_eq!(report["columns"].as_array().unwrap().len(), 11);

    let row = &report["rows"][0];
    assert_eq!(row["no"], 1);
    assert_eq!(row["nama_material"], "Konektor");
    assert_eq!(row["kategori"], "MCB");
    assert_eq!(row["jumlah"], "7");
    assert_eq!(row["satuan"], "BH");
    assert_eq!(row["kondisi"], "Material Bekas Handal");
    assert_eq!(row["status"], "Ditolak");
    assert_eq!(row["diinput_oleh"], "Budi Staff");
    assert_eq!(row["diverifikasi_oleh"], "Sari Verifikator");
    assert_eq!(row["catatan"], "segel rusak");
}

#[tokio::test]
async fn empty_export_is_refused() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/reports/export", None, &app.admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REPORT_NOTHING_TO_EXPORT");

    app.submit_material(&app.staff.token, "Trafo", 1).await;
    let (status, body) = app
        .call(
            Method::GET,
            "/api/v1/reports/export?condition=limbah",
            None,
            &app.admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REPORT_NOTHING_TO_EXPORT");
}
