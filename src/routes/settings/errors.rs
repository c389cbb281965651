use crate::errors::GenericError;
use crate::setting_service::SettingServiceError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    ServiceError(#[from] SettingServiceError),
}

impl std::fmt::Debug for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<SettingsError> for GenericError {
    fn from(err: SettingsError) -> GenericError {
        match err {
            SettingsError::ValidationError(message) => GenericError::ValidationError(message),
            SettingsError::ServiceError(error) => {
                GenericError::UnexpectedCustomError(error.to_string())
            }
        }
    }
}
