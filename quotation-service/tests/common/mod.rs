#![allow(dead_code)]

use quotation_service::config::QuotationConfig;
use quotation_service::startup::Application;
use reqwest::{redirect::Policy, Client, Response};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Cookie-carrying client that does not follow redirects.
    pub client: Client,
    pub catalog_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let catalog_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = QuotationConfig::for_memory_store(catalog_dir.path().join("catalog.json"));
        config.common.port = 0; // Random port for testing
        config.relationship_managers = vec!["Priya S".to_string(), "Arjun K".to_string()];

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            catalog_dir,
        }
    }

    /// Spawn and sign in with the configured credentials.
    pub async fn spawn_logged_in() -> Self {
        let app = Self::spawn().await;
        let response = app.login(USERNAME, PASSWORD).await;
        assert_eq!(response.status().as_u16(), 303);
        app
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a quotation through the API and return its id.
    pub async fn create_quotation(&self, number: &str, manager: &str, status: &str) -> String {
        let mut body = quotation_body(number);
        body["relationshipManager"] = json!(manager);
        body["status"] = json!(status);

        let response = self.post_json("/api/quotations", &body).await;
        assert_eq!(response.status().as_u16(), 201);
        let created: Value = response.json().await.expect("Failed to parse JSON");
        created["quotationId"].as_str().expect("quotationId missing").to_string()
    }
}

pub fn customer() -> Value {
    json!({
        "name": "Dr. Meera Rao",
        "company": "City Clinic",
        "addressLine1": "4 Lake View",
        "city": "Pune",
        "state": "MH",
        "zip": "411001",
        "email": "meera@example.com"
    })
}

/// Two lines: 2 x 118 at 18% and 3 x 100 at 0%.
pub fn items() -> Value {
    json!([
        {
            "productId": "GLV-M",
            "title": "Nitrile Gloves",
            "imageSrc": "",
            "quantity": 2,
            "unitPrice": 118,
            "gstRate": 18
        },
        {
            "productId": "MSK-1",
            "title": "Face Mask",
            "quantity": 3,
            "unitPrice": 100,
            "gstRate": 0
        }
    ])
}

pub fn quotation_body(number: &str) -> Value {
    json!({
        "quotationNumber": number,
        "relationshipManager": "Priya S",
        "issueDate": "2026-10-01",
        "dueDate": "2026-10-31",
        "customer": customer(),
        "items": items()
    })
}

pub fn invoice_body(number: &str) -> Value {
    json!({
        "invoiceNumber": number,
        "issueDate": "2026-10-01",
        "dueDate": "2026-10-31",
        "customer": customer(),
        "items": items()
    })
}

/// Amounts are serialized as decimal strings.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("Not a decimal string"),
        other => other.to_string().parse().expect("Not a decimal"),
    }
}

pub fn location(response: &Response) -> String {
    response.headers()["location"]
        .to_str()
        .expect("Invalid location header")
        .to_string()
}
