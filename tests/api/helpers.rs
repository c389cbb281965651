use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use once_cell::sync::Lazy;
use secrecy::SecretString;
use uuid::Uuid;

use mollie_payments_adapter::{
    configuration::get_configuration,
    mollie_client::{
        MollieAmount, MollieClientError, MollieGateway, MollieLink, MollieOrderLineResponse,
        MollieOrderLinks, MollieOrderRefundRequest, MollieOrderRefundResponse, MollieOrderRequest,
        MollieOrderResponse, MollieOrderStatus,
    },
    order_store::{InMemoryOrderStore, OrderStore},
    routes::payment::schemas::{Order, OrderAddress, OrderItem, PaymentStatus},
    schemas::CurrencyType,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    let test_log = std::env::var("TEST_LOG")
        .map(|value| value == "true")
        .unwrap_or(false);
    if test_log {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const STUB_CHECKOUT_URL: &str = "https://www.mollie.com/checkout/select-method/stub";

/// Gateway double backing the whole API suite: orders created through it are
/// kept in memory so webhook and refund calls can read them back.
pub struct StubGateway {
    orders: Mutex<Vec<MollieOrderResponse>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
        }
    }

    /// Seeds a gateway-side order, as if a previous checkout had created it.
    pub fn push_order(&self, order: MollieOrderResponse) {
        self.orders.lock().unwrap().push(order);
    }
}

#[async_trait]
impl MollieGateway for StubGateway {
    async fn create_order(
        &self,
        _api_key: &SecretString,
        request: &MollieOrderRequest,
    ) -> Result<MollieOrderResponse, MollieClientError> {
        let mut orders = self.orders.lock().unwrap();
        let response = MollieOrderResponse {
            id: format!("ord_stub_{}", orders.len() + 1),
            order_number: request.order_number.clone(),
            status: MollieOrderStatus::Created,
            amount: request.amount.clone(),
            lines: request
                .lines
                .iter()
                .enumerate()
                .map(|(index, line)| MollieOrderLineResponse {
                    id: format!("odl_stub_{}", index + 1),
                    name: Some(line.name.clone()),
                    sku: line.sku.clone(),
                    total_amount: line.total_amount.clone(),
                })
                .collect(),
            links: MollieOrderLinks {
                checkout: Some(MollieLink {
                    href: STUB_CHECKOUT_URL.to_string(),
                }),
            },
        };
        orders.push(response.clone());
        Ok(response)
    }

    async fn get_order(
        &self,
        _api_key: &SecretString,
        gateway_order_id: &str,
    ) -> Result<MollieOrderResponse, MollieClientError> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == gateway_order_id)
            .cloned()
            .ok_or(MollieClientError::Api {
                status: 404,
                title: "Not Found".to_string(),
                detail: format!("No order exists with token {}.", gateway_order_id),
            })
    }

    async fn list_orders(
        &self,
        _api_key: &SecretString,
    ) -> Result<Vec<MollieOrderResponse>, MollieClientError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn create_order_refund(
        &self,
        _api_key: &SecretString,
        gateway_order_id: &str,
        request: &MollieOrderRefundRequest,
    ) -> Result<MollieOrderRefundResponse, MollieClientError> {
        let refunded: BigDecimal = request
            .lines
            .iter()
            .map(|line| BigDecimal::from_str(&line.amount.value).unwrap())
            .sum();
        Ok(MollieOrderRefundResponse {
            id: "re_stub_1".to_string(),
            amount: MollieAmount::new(CurrencyType::Eur, &refunded),
            status: Some("pending".to_string()),
            order_id: Some(gateway_order_id.to_string()),
        })
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub order_store: Arc<InMemoryOrderStore>,
    pub gateway: Arc<StubGateway>,
    pub admin_token: String,
}

impl TestApp {
    pub async fn seed_order(&self, order: Order) {
        self.order_store.save_order(order).await;
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = 0;
        c
    };
    let admin_token = "dev-admin-token".to_string();

    let gateway = Arc::new(StubGateway::new());
    let order_store = Arc::new(InMemoryOrderStore::new());
    let application = Application::build_with_dependencies(
        configuration,
        gateway.clone(),
        order_store.clone(),
    )
    .await
    .expect("Failed to build application.");
    let application_port = application.port();

    let address = format!("http://127.0.0.1:{}", application_port);
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        port: application_port,
        api_client,
        order_store,
        gateway,
        admin_token,
    }
}

pub fn sample_address() -> OrderAddress {
    OrderAddress {
        first_name: Some("Jan".to_string()),
        last_name: Some("Jansen".to_string()),
        email: Some("jan@example.com".to_string()),
        street: Some("Keizersgracht 126".to_string()),
        city: Some("Amsterdam".to_string()),
        region: Some("NH".to_string()),
        postal_code: Some("1015 CW".to_string()),
        country_code: Some("NL".to_string()),
    }
}

pub fn sample_order(order_number: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_number: order_number.to_string(),
        order_total: BigDecimal::from_str("121.00").unwrap(),
        shipping_total_incl_tax: BigDecimal::from_str("10.00").unwrap(),
        shipping_method: "Ground shipping".to_string(),
        tax_rates: "21.0%".to_string(),
        pickup_in_store: false,
        billing_address: Some(sample_address()),
        shipping_address: Some(sample_address()),
        pickup_address: None,
        items: vec![
            OrderItem {
                product_name: "Build your own computer".to_string(),
                sku: Some("COMP_CUST".to_string()),
                quantity: 2,
                unit_price_incl_tax: BigDecimal::from_str("25.00").unwrap(),
                unit_price_excl_tax: BigDecimal::from_str("20.66").unwrap(),
            },
            OrderItem {
                product_name: "Fiction book".to_string(),
                sku: None,
                quantity: 1,
                unit_price_incl_tax: BigDecimal::from_str("61.00").unwrap(),
                unit_price_excl_tax: BigDecimal::from_str("50.41").unwrap(),
            },
        ],
        payment_status: PaymentStatus::Pending,
        created_at: Utc::now(),
    }
}
