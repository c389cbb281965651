use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::schemas::CurrencyType;
use crate::utils::{error_chain_fmt, round_to_minor_units};

/// Live and test credentials as persisted in the plugin settings.
#[derive(Debug, Clone)]
pub struct ApiKeyPair {
    pub live: SecretString,
    pub test: SecretString,
}

/// Picks the credential matching the sandbox flag, regardless of key contents.
pub fn resolve_api_key(use_sandbox: bool, keys: &ApiKeyPair) -> &SecretString {
    if use_sandbox {
        &keys.test
    } else {
        &keys.live
    }
}

#[derive(thiserror::Error)]
pub enum MollieClientError {
    #[error("Request to the payment gateway timed out")]
    Timeout,
    #[error("Failed to reach the payment gateway: {0}")]
    Request(reqwest::Error),
    #[error("Gateway rejected the request ({status}): {title}: {detail}")]
    Api {
        status: u16,
        title: String,
        detail: String,
    },
    #[error("Failed to parse the gateway response: {0}")]
    Deserialization(String),
}

impl std::fmt::Debug for MollieClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<reqwest::Error> for MollieClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MollieClientError::Timeout
        } else {
            MollieClientError::Request(err)
        }
    }
}

/// Monetary value in the gateway wire form: currency code plus a
/// fixed-2-decimal string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct MollieAmount {
    pub currency: CurrencyType,
    pub value: String,
}

impl MollieAmount {
    pub fn new(currency: CurrencyType, value: &BigDecimal) -> Self {
        Self {
            currency,
            value: round_to_minor_units(value).to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MolliePaymentMethod {
    Ideal,
    #[serde(rename = "creditcard")]
    CreditCard,
    Paypal,
    Bancontact,
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_and_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderLineRequest {
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub unit_price: MollieAmount,
    pub total_amount: MollieAmount,
    pub vat_rate: String,
    pub vat_amount: MollieAmount,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderRequest {
    pub amount: MollieAmount,
    pub order_number: String,
    pub lines: Vec<MollieOrderLineRequest>,
    #[serde(rename = "method")]
    pub methods: Vec<MolliePaymentMethod>,
    pub billing_address: MollieOrderAddress,
    pub shipping_address: MollieOrderAddress,
    pub locale: String,
    pub shopper_country_must_match_billing_country: bool,
    pub redirect_url: String,
    pub webhook_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MollieOrderStatus {
    Created,
    Pending,
    Authorized,
    Paid,
    Shipping,
    Completed,
    Canceled,
    Expired,
}

impl MollieOrderStatus {
    /// Whether the gateway considers the order settled for payment purposes.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            MollieOrderStatus::Paid
                | MollieOrderStatus::Authorized
                | MollieOrderStatus::Shipping
                | MollieOrderStatus::Completed
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderLineResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub total_amount: MollieAmount,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MollieLink {
    pub href: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MollieOrderLinks {
    #[serde(default)]
    pub checkout: Option<MollieLink>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderResponse {
    pub id: String,
    pub order_number: String,
    pub status: MollieOrderStatus,
    pub amount: MollieAmount,
    #[serde(default)]
    pub lines: Vec<MollieOrderLineResponse>,
    #[serde(rename = "_links", default)]
    pub links: MollieOrderLinks,
}

#[derive(Debug, Deserialize)]
struct MollieOrderListEmbedded {
    orders: Vec<MollieOrderResponse>,
}

#[derive(Debug, Deserialize)]
struct MollieOrderListResponse {
    #[serde(rename = "_embedded")]
    embedded: MollieOrderListEmbedded,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieRefundLine {
    pub id: String,
    pub quantity: u32,
    pub amount: MollieAmount,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderRefundRequest {
    pub lines: Vec<MollieRefundLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrderRefundResponse {
    pub id: String,
    pub amount: MollieAmount,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MollieErrorResponse {
    status: u16,
    title: String,
    detail: String,
}

/// Seam between the handlers and the gateway so tests can substitute a stub.
#[async_trait]
pub trait MollieGateway: Send + Sync {
    async fn create_order(
        &self,
        api_key: &SecretString,
        request: &MollieOrderRequest,
    ) -> Result<MollieOrderResponse, MollieClientError>;

    async fn get_order(
        &self,
        api_key: &SecretString,
        gateway_order_id: &str,
    ) -> Result<MollieOrderResponse, MollieClientError>;

    async fn list_orders(
        &self,
        api_key: &SecretString,
    ) -> Result<Vec<MollieOrderResponse>, MollieClientError>;

    async fn create_order_refund(
        &self,
        api_key: &SecretString,
        gateway_order_id: &str,
        request: &MollieOrderRefundRequest,
    ) -> Result<MollieOrderRefundResponse, MollieClientError>;
}

#[derive(Debug)]
pub struct MollieApiClient {
    http_client: Client,
    base_url: String,
}

impl MollieApiClient {
    #[tracing::instrument]
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, MollieClientError> {
        tracing::info!("Establishing connection to the Mollie API.");
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn auth_header(api_key: &SecretString) -> String {
        format!("Bearer {}", api_key.expose_secret())
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MollieClientError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|err| MollieClientError::Deserialization(err.to_string()))
        } else {
            let error_body = response.json::<MollieErrorResponse>().await.map_err(|_| {
                MollieClientError::Api {
                    status: status.as_u16(),
                    title: status.to_string(),
                    detail: "gateway returned an unparseable error body".to_string(),
                }
            })?;
            Err(MollieClientError::Api {
                status: error_body.status,
                title: error_body.title,
                detail: error_body.detail,
            })
        }
    }
}

#[async_trait]
impl MollieGateway for MollieApiClient {
    #[tracing::instrument(skip(self, api_key, request), fields(order_number = %request.order_number))]
    async fn create_order(
        &self,
        api_key: &SecretString,
        request: &MollieOrderRequest,
    ) -> Result<MollieOrderResponse, MollieClientError> {
        let url = format!("{}/v2/orders", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", Self::auth_header(api_key))
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    #[tracing::instrument(skip(self, api_key))]
    async fn get_order(
        &self,
        api_key: &SecretString,
        gateway_order_id: &str,
    ) -> Result<MollieOrderResponse, MollieClientError> {
        let url = format!("{}/v2/orders/{}", self.base_url, gateway_order_id);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", Self::auth_header(api_key))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    #[tracing::instrument(skip(self, api_key))]
    async fn list_orders(
        &self,
        api_key: &SecretString,
    ) -> Result<Vec<MollieOrderResponse>, MollieClientError> {
        let url = format!("{}/v2/orders", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", Self::auth_header(api_key))
            .send()
            .await?;
        let list: MollieOrderListResponse = Self::parse_response(response).await?;
        Ok(list.embedded.orders)
    }

    #[tracing::instrument(skip(self, api_key, request))]
    async fn create_order_refund(
        &self,
        api_key: &SecretString,
        gateway_order_id: &str,
        request: &MollieOrderRefundRequest,
    ) -> Result<MollieOrderRefundResponse, MollieClientError> {
        let url = format!("{}/v2/orders/{}/refunds", self.base_url, gateway_order_id);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", Self::auth_header(api_key))
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
