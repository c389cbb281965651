use mollie_payments_adapter::mollie_client::{
    MollieAmount, MollieOrderLineResponse, MollieOrderLinks, MollieOrderResponse,
    MollieOrderStatus,
};
use mollie_payments_adapter::order_store::OrderStore;
use mollie_payments_adapter::routes::payment::schemas::PaymentStatus;
use mollie_payments_adapter::schemas::CurrencyType;

use crate::helpers::{sample_order, spawn_app, STUB_CHECKOUT_URL};

fn paid_gateway_order(id: &str, order_number: &str) -> MollieOrderResponse {
    MollieOrderResponse {
        id: id.to_string(),
        order_number: order_number.to_string(),
        status: MollieOrderStatus::Paid,
        amount: MollieAmount {
            currency: CurrencyType::Eur,
            value: "121.00".to_string(),
        },
        lines: vec![MollieOrderLineResponse {
            id: "odl_stub_1".to_string(),
            name: Some("Build your own computer".to_string()),
            sku: Some("COMP_CUST".to_string()),
            total_amount: MollieAmount {
                currency: CurrencyType::Eur,
                value: "50.00".to_string(),
            },
        }],
        links: MollieOrderLinks::default(),
    }
}

#[actix_web::test]
async fn checkout_redirects_to_the_gateway_checkout_page() {
    let app = spawn_app().await;
    app.seed_order(sample_order("1042")).await;

    let response = app
        .api_client
        .post(&format!("{}/payment/checkout", &app.address))
        .json(&serde_json::json!({"orderNumber": "1042"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        STUB_CHECKOUT_URL
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["checkoutUrl"], STUB_CHECKOUT_URL);
    assert_eq!(body["data"]["gatewayOrderId"], "ord_stub_1");

    let order = app.order_store.order_by_number("1042").await.unwrap();
    assert_eq!(
        order.payment_status,
        PaymentStatus::AwaitingGatewayRedirect
    );
}

#[actix_web::test]
async fn checkout_for_an_unknown_order_is_reported_as_missing_data() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/payment/checkout", &app.address))
        .json(&serde_json::json!({"orderNumber": "no-such-order"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 410);
}

#[actix_web::test]
async fn webhook_marks_the_correlated_order_paid() {
    let app = spawn_app().await;
    app.seed_order(sample_order("1042")).await;
    app.gateway.push_order(paid_gateway_order("ord_abc", "1042"));

    let response = app
        .api_client
        .post(&format!("{}/payment/webhook?id=ord_abc", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let order = app.order_store.order_by_number("1042").await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
}

#[actix_web::test]
async fn webhook_failures_are_still_acknowledged_with_200() {
    let app = spawn_app().await;

    // no gateway order exists for this id
    let response = app
        .api_client
        .post(&format!("{}/payment/webhook?id=ord_missing", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[actix_web::test]
async fn webhook_with_unknown_merchant_order_number_reports_the_error() {
    let app = spawn_app().await;
    app.gateway
        .push_order(paid_gateway_order("ord_abc", "not-a-local-order"));

    let response = app
        .api_client
        .post(&format!("{}/payment/webhook?id=ord_abc", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[actix_web::test]
async fn refund_of_a_fully_paid_order_is_derived_as_full_refund() {
    let app = spawn_app().await;
    let mut order = sample_order("1042");
    order.payment_status = PaymentStatus::Paid;
    // one local item refunded against the single gateway line
    order.items.truncate(1);
    app.seed_order(order).await;

    let mut gateway_order = paid_gateway_order("ord_abc", "1042");
    gateway_order.amount.value = "50.00".to_string();
    app.gateway.push_order(gateway_order);

    let response = app
        .api_client
        .post(&format!("{}/payment/refund", &app.address))
        .json(&serde_json::json!({"orderNumber": "1042"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "refunded");
    let order = app.order_store.order_by_number("1042").await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
}

#[actix_web::test]
async fn full_refund_of_a_checkout_created_order_is_reported_as_refunded() {
    let app = spawn_app().await;
    app.seed_order(sample_order("1042")).await;

    // the gateway order carries the item lines plus the shipping line
    let response = app
        .api_client
        .post(&format!("{}/payment/checkout", &app.address))
        .json(&serde_json::json!({"orderNumber": "1042"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 303);

    app.order_store
        .update_payment_status("1042", PaymentStatus::Paid)
        .await
        .unwrap();

    let response = app
        .api_client
        .post(&format!("{}/payment/refund", &app.address))
        .json(&serde_json::json!({"orderNumber": "1042"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "refunded");
    let order = app.order_store.order_by_number("1042").await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
}

#[actix_web::test]
async fn refund_without_matching_gateway_order_is_an_explicit_error() {
    let app = spawn_app().await;
    app.seed_order(sample_order("1042")).await;

    let response = app
        .api_client
        .post(&format!("{}/payment/refund", &app.address))
        .json(&serde_json::json!({"orderNumber": "1042"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 410);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[actix_web::test]
async fn unsupported_capabilities_answer_501() {
    let app = spawn_app().await;

    for path in [
        "/payment/capture",
        "/payment/void",
        "/payment/recurring/process",
        "/payment/recurring/cancel",
    ] {
        let response = app
            .api_client
            .post(&format!("{}{}", &app.address, path))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status().as_u16(), 501, "unexpected status for {}", path);
    }
}
