use crate::errors::GenericError;
use actix_http::Payload;
use actix_web::web::Json;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    /// Store scope to resolve; 0 or absent = all stores.
    pub store_id: Option<u32>,
}

/// Effective configuration for one store scope, as shown on the admin page.
/// Override flags are only present for a concrete store scope.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationModel {
    pub use_sandbox: bool,
    pub api_live_key: String,
    pub api_test_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_sandbox_override_for_store: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_live_key_override_for_store: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_test_key_override_for_store: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdateRequest {
    pub store_id: Option<u32>,
    pub use_sandbox: bool,
    pub api_live_key: String,
    pub api_test_key: String,
    #[serde(default)]
    pub use_sandbox_override_for_store: bool,
    #[serde(default)]
    pub api_live_key_override_for_store: bool,
    #[serde(default)]
    pub api_test_key_override_for_store: bool,
}

impl FromRequest for SettingsUpdateRequest {
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
