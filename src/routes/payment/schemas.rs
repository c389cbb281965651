use crate::errors::GenericError;
use actix_http::Payload;
use actix_web::web::Json;
use actix_web::{FromRequest, HttpRequest};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    AwaitingGatewayRedirect,
    Paid,
    Refunded,
    PartiallyRefunded,
}

/// Address snapshot taken from the store order. Every field is optional:
/// a missing address, country or region lookup omits the field in the
/// gateway payload instead of failing the checkout.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    /// Two-letter ISO country code.
    pub country_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub unit_price_incl_tax: BigDecimal,
    #[schema(value_type = String)]
    pub unit_price_excl_tax: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Merchant order number; must map back to exactly one local order.
    pub order_number: String,
    #[schema(value_type = String)]
    pub order_total: BigDecimal,
    #[schema(value_type = String)]
    pub shipping_total_incl_tax: BigDecimal,
    pub shipping_method: String,
    /// Tax rate as stored by the framework, e.g. "21.0%".
    pub tax_rates: String,
    pub pickup_in_store: bool,
    pub billing_address: Option<OrderAddress>,
    pub shipping_address: Option<OrderAddress>,
    pub pickup_address: Option<OrderAddress>,
    pub items: Vec<OrderItem>,
    pub payment_status: PaymentStatus,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub order_number: String,
    /// Store scope the plugin settings are resolved for; 0 = all stores.
    pub store_id: Option<u32>,
}

impl FromRequest for CheckoutRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub checkout_url: String,
    pub gateway_order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookParams {
    /// Gateway-assigned order id, e.g. "ord_kEn1PlbGa".
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub order_number: String,
    pub store_id: Option<u32>,
    /// What the caller believes the refund scope is. The resulting status is
    /// derived from the gateway response; a mismatch is only logged.
    #[serde(default)]
    pub is_partial_refund: bool,
}

impl FromRequest for RefundRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundData {
    pub order_number: String,
    pub refund_id: String,
    pub status: PaymentStatus,
}
