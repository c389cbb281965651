use actix_web::web;
use secrecy::{ExposeSecret, SecretString};
use utoipa::TupleUnit;

use super::errors::SettingsError;
use super::schemas::{ConfigurationModel, SettingsQuery, SettingsUpdateRequest};
use crate::errors::GenericError;
use crate::schemas::GenericResponse;
use crate::setting_service::{SettingField, SettingService, SettingsForm, ALL_STORES_SCOPE};

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Settings",
    description = "Effective plugin configuration for a store scope, with per-field override flags.",
    summary = "Read Plugin Configuration",
    params(("store_id" = Option<u32>, Query, description = "Store scope, 0 = all stores")),
    responses(
        (status=200, description= "Current configuration", body= GenericResponse<ConfigurationModel>),
        (status=401, description= "Invalid admin token", body= GenericResponse<TupleUnit>),
        (status=500, description= "Internal Server Error", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "read plugin configuration", skip(setting_service))]
pub async fn get_settings(
    query: web::Query<SettingsQuery>,
    setting_service: web::Data<SettingService>,
) -> Result<web::Json<GenericResponse<ConfigurationModel>>, GenericError> {
    let store_scope = query.store_id.unwrap_or(ALL_STORES_SCOPE);
    let settings = setting_service
        .load_setting(store_scope)
        .map_err(SettingsError::from)?;

    let mut model = ConfigurationModel {
        use_sandbox: settings.use_sandbox,
        api_live_key: settings.api_live_key.expose_secret().to_string(),
        api_test_key: settings.api_test_key.expose_secret().to_string(),
        use_sandbox_override_for_store: None,
        api_live_key_override_for_store: None,
        api_test_key_override_for_store: None,
    };
    if store_scope != ALL_STORES_SCOPE {
        model.use_sandbox_override_for_store =
            Some(setting_service.setting_exists(SettingField::UseSandbox, store_scope));
        model.api_live_key_override_for_store =
            Some(setting_service.setting_exists(SettingField::ApiLiveKey, store_scope));
        model.api_test_key_override_for_store =
            Some(setting_service.setting_exists(SettingField::ApiTestKey, store_scope));
    }

    Ok(web::Json(GenericResponse::success(
        "Current plugin configuration",
        Some(model),
    )))
}

#[utoipa::path(
    post,
    path = "/settings",
    tag = "Settings",
    description = "Saves the plugin configuration; each field is independently overridable per store scope.",
    summary = "Save Plugin Configuration",
    request_body(content = SettingsUpdateRequest, description = "Request Body"),
    responses(
        (status=200, description= "Configuration saved", body= GenericResponse<TupleUnit>),
        (status=400, description= "Invalid Request body", body= GenericResponse<TupleUnit>),
        (status=401, description= "Invalid admin token", body= GenericResponse<TupleUnit>),
        (status=500, description= "Internal Server Error", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "save plugin configuration", skip(setting_service, body))]
pub async fn save_settings(
    body: SettingsUpdateRequest,
    setting_service: web::Data<SettingService>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let store_scope = body.store_id.unwrap_or(ALL_STORES_SCOPE);
    let form = SettingsForm {
        use_sandbox: body.use_sandbox,
        use_sandbox_override_for_store: body.use_sandbox_override_for_store,
        api_live_key: SecretString::from(body.api_live_key),
        api_live_key_override_for_store: body.api_live_key_override_for_store,
        api_test_key: SecretString::from(body.api_test_key),
        api_test_key_override_for_store: body.api_test_key_override_for_store,
    };
    setting_service
        .save_setting_overridable_per_store(form, store_scope)
        .map_err(SettingsError::from)?;

    tracing::info!(%store_scope, "Plugin configuration saved.");
    Ok(web::Json(GenericResponse::success(
        "Configuration saved",
        Some(()),
    )))
}
