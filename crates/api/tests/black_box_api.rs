use std::sync::Arc;

use ordergate_api::app::{self, services::AppServices};
use ordergate_infra::MemoryStore;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

struct TestServer {
    base_url: String,
    store: Arc<MemoryStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port and
        // keep a handle on the backing store for test setup/assertions.
        let store = Arc::new(MemoryStore::new());
        let services = Arc::new(AppServices::over(store.clone()));
        let app = app::build_app_with(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn order_payload(partner_id: &str, product_id: &str, quantity: i64, price_unit: i64) -> serde_json::Value {
    json!({
        "partner_id": partner_id,
        "order_line": [
            { "product_id": product_id, "quantity": quantity, "price_unit": price_unit }
        ]
    })
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_payload_yields_a_field_error_map() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/orders/fulfill", srv.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["errors"]["partner_id"][0], "Partner ID is required.");
    assert_eq!(body["errors"]["order_line"][0], "Order lines are required.");
    assert_eq!(srv.store.invoice_count(), 0);
}

#[tokio::test]
async fn order_crud_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Create (+ confirm, as the legacy endpoint does).
    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&order_payload(
            &Uuid::now_v7().to_string(),
            &Uuid::now_v7().to_string(),
            5,
            100,
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let order_id = body["order_id"].as_str().unwrap().to_string();

    // Read it back.
    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["order_name"], "SO0001");
    assert_eq!(body["data"]["state"], "sale");
    assert_eq!(body["data"]["amount_total"], 500);

    // Naive update: append a line.
    let res = client
        .put(format!("{}/orders/{}", srv.base_url, order_id))
        .json(&json!({
            "order_lines": [
                { "product_id": Uuid::now_v7().to_string(), "quantity": 2, "price_unit": 50 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["lines"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["amount_total"], 600);

    // List envelope keeps the legacy pagination fields.
    let res = client
        .get(format!("{}/orders?page=1&per_page=10", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total_result"], 1);
    assert_eq!(body["current_count"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["data"][0]["order_name"], "SO0001");

    // Delete, then the order is gone.
    let res = client
        .delete(format!("{}/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Order deleted successfully.");

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_with_malformed_id_is_a_bad_request() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/orders/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fulfill_delivers_and_invoices() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/orders/fulfill", srv.base_url))
        .json(&order_payload(
            &Uuid::now_v7().to_string(),
            &Uuid::now_v7().to_string(),
            5,
            100,
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert!(body["invoice_id"].is_string());
    assert_eq!(body["picking_ids"].as_array().unwrap().len(), 1);
    assert_eq!(body["return_picking_ids"].as_array().unwrap().len(), 0);
    assert_eq!(srv.store.invoice_count(), 1);
}

#[tokio::test]
async fn fulfill_with_negative_qty_done_creates_a_return() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let mut payload = order_payload(
        &Uuid::now_v7().to_string(),
        &Uuid::now_v7().to_string(),
        5,
        100,
    );
    payload["qty_done"] = json!(-2);

    let res = client
        .post(format!("{}/orders/fulfill", srv.base_url))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["return_picking_ids"].as_array().unwrap().len(), 1);
    assert!(body["invoice_id"].is_string());
}

#[tokio::test]
async fn fulfill_without_stock_is_a_conflict_and_never_invoices() {
    let srv = TestServer::spawn().await;

    let product_id = Uuid::now_v7();
    srv.store.set_stock(product_id.into(), 2);

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/orders/fulfill", srv.base_url))
        .json(&order_payload(
            &Uuid::now_v7().to_string(),
            &product_id.to_string(),
            5,
            100,
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("cannot assign"));
    assert_eq!(srv.store.invoice_count(), 0);

    // The order itself survived the failed tail.
    let res = client
        .get(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total_result"], 1);
    assert_eq!(body["data"][0]["state"], "sale");
}

#[tokio::test]
async fn zero_total_orders_fulfill_without_an_invoice() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/orders/fulfill", srv.base_url))
        .json(&order_payload(
            &Uuid::now_v7().to_string(),
            &Uuid::now_v7().to_string(),
            5,
            0,
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert!(body["invoice_id"].is_null());
    assert_eq!(srv.store.invoice_count(), 0);
}
