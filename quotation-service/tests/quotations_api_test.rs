mod common;

use common::{decimal, quotation_body, TestApp};
use rust_decimal::Decimal;
use serde_json::{json, Value};

#[tokio::test]
async fn create_quotation_returns_201_with_id() {
    let app = TestApp::spawn_logged_in().await;

    let response = app
        .post_json("/api/quotations", &quotation_body("QUO-0001"))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Quotation saved successfully");
    let id = body["quotationId"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn server_recomputes_amounts_and_applies_defaults() {
    let app = TestApp::spawn_logged_in().await;

    let mut body = quotation_body("QUO-0002");
    // Client-side derived amounts are ignored.
    body["items"][0]["taxAmount"] = json!(999);
    body["items"][0]["totalAmount"] = json!(1);
    body["grandTotal"] = json!(5);

    let response = app.post_json("/api/quotations", &body).await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();

    let response = app
        .get(&format!("/api/quotations/{}", created["quotationId"].as_str().unwrap()))
        .await;
    assert!(response.status().is_success());
    let quotation: Value = response.json().await.unwrap();

    assert_eq!(quotation["status"], "In Process");
    assert_eq!(quotation["companyInfo"]["name"], "Acme Medical Supplies");
    assert_eq!(quotation["customer"]["name"], "Dr. Meera Rao");

    let first = &quotation["items"][0];
    assert_eq!(decimal(&first["taxAmount"]), Decimal::from(36));
    assert_eq!(decimal(&first["totalAmount"]), Decimal::from(236));

    assert_eq!(decimal(&quotation["grandTotal"]), Decimal::from(536));
    assert_eq!(decimal(&quotation["totalTax"]), Decimal::from(36));
    assert_eq!(decimal(&quotation["subtotal"]), Decimal::from(500));
}

#[tokio::test]
async fn create_quotation_rejects_missing_items() {
    let app = TestApp::spawn_logged_in().await;

    let mut body = quotation_body("QUO-0003");
    body["items"] = json!([]);

    let response = app.post_json("/api/quotations", &body).await;
    assert_eq!(response.status().as_u16(), 400);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Validation error");
    assert!(error["details"]
        .as_str()
        .unwrap()
        .contains("At least one item is required"));
}

#[tokio::test]
async fn create_quotation_rejects_missing_number_and_manager() {
    let app = TestApp::spawn_logged_in().await;

    let mut body = quotation_body("");
    body["relationshipManager"] = json!("   ");

    let response = app.post_json("/api/quotations", &body).await;
    assert_eq!(response.status().as_u16(), 400);

    let error: Value = response.json().await.unwrap();
    let details = error["details"].as_str().unwrap();
    assert!(details.contains("Quotation number is required"));
    assert!(details.contains("Relationship manager is required"));
}

#[tokio::test]
async fn create_quotation_rejects_bad_line_and_status() {
    let app = TestApp::spawn_logged_in().await;

    let mut body = quotation_body("QUO-0004");
    body["items"][1]["quantity"] = json!(0);
    let response = app.post_json("/api/quotations", &body).await;
    assert_eq!(response.status().as_u16(), 400);
    let error: Value = response.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().starts_with("Item 2:"));

    let mut body = quotation_body("QUO-0005");
    body["status"] = json!("Pending");
    let response = app.post_json("/api/quotations", &body).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::spawn_logged_in().await;

    let response = app
        .client
        .post(app.url("/api/quotations"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn list_filters_by_manager_and_status() {
    let app = TestApp::spawn_logged_in().await;

    app.create_quotation("QUO-0001", "Priya S", "In Process").await;
    app.create_quotation("QUO-0002", "Priya S", "Won").await;
    app.create_quotation("QUO-0003", "Arjun K", "Won").await;

    let all: Vec<Value> = app.get("/api/quotations").await.json().await.unwrap();
    assert_eq!(all.len(), 3);
    // Newest first.
    assert_eq!(all[0]["quotationNumber"], "QUO-0003");

    let priya: Vec<Value> = app
        .get("/api/quotations?relationshipManager=Priya%20S")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(priya.len(), 2);

    let priya_won: Vec<Value> = app
        .get("/api/quotations?relationshipManager=Priya%20S&status=Won")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(priya_won.len(), 1);
    assert_eq!(priya_won[0]["quotationNumber"], "QUO-0002");

    let won: Vec<Value> = app
        .get("/api/quotations?status=Won")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(won.len(), 2);
}

#[tokio::test]
async fn unknown_status_filter_is_ignored() {
    let app = TestApp::spawn_logged_in().await;

    app.create_quotation("QUO-0001", "Priya S", "Lost").await;
    app.create_quotation("QUO-0002", "Arjun K", "Won").await;

    let listed: Vec<Value> = app
        .get("/api/quotations?status=Archived")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn get_unknown_or_malformed_id_is_404() {
    let app = TestApp::spawn_logged_in().await;

    let response = app.get("/api/quotations/0123456789abcdef01234567").await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app.get("/api/quotations/not-an-id").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn patch_updates_status() {
    let app = TestApp::spawn_logged_in().await;
    let id = app.create_quotation("QUO-0001", "Priya S", "In Process").await;

    let response = app
        .patch_json(&format!("/api/quotations/{}", id), &json!({ "status": "Won" }))
        .await;
    assert!(response.status().is_success());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "Won");
    assert_eq!(updated["quotationNumber"], "QUO-0001");

    let fetched: Value = app
        .get(&format!("/api/quotations/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["status"], "Won");
}

#[tokio::test]
async fn patch_without_status_is_400() {
    let app = TestApp::spawn_logged_in().await;
    let id = app.create_quotation("QUO-0001", "Priya S", "In Process").await;

    let response = app
        .patch_json(
            &format!("/api/quotations/{}", id),
            &json!({ "customer": { "name": "Someone" } }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "No valid fields provided for update.");
}

#[tokio::test]
async fn patch_with_invalid_status_is_400() {
    let app = TestApp::spawn_logged_in().await;
    let id = app.create_quotation("QUO-0001", "Priya S", "In Process").await;

    let response = app
        .patch_json(&format!("/api/quotations/{}", id), &json!({ "status": "won" }))
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn patch_unknown_id_is_404() {
    let app = TestApp::spawn_logged_in().await;

    let response = app
        .patch_json(
            "/api/quotations/0123456789abcdef01234567",
            &json!({ "status": "Lost" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn dashboard_api_summarises_quotations() {
    let app = TestApp::spawn_logged_in().await;

    app.create_quotation("QUO-0001", "Priya S", "Won").await;
    app.create_quotation("QUO-0002", "Priya S", "Lost").await;

    let stats: Value = app.get("/api/dashboard").await.json().await.unwrap();
    assert_eq!(stats["totalQuotations"], 2);
    assert_eq!(stats["wonCount"], 1);
    assert_eq!(stats["lostCount"], 1);
    assert_eq!(decimal(&stats["totalValueWon"]), Decimal::from(536));
    assert_eq!(decimal(&stats["averageQuotationValue"]), Decimal::from(536));
}
