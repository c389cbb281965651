use crate::errors::GenericError;
use crate::mollie_client::MollieClientError;
use crate::setting_service::SettingServiceError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum PaymentError {
    #[error("{0}")]
    ValidationError(String),
    #[error("No order found for order number {0}")]
    OrderNotFoundError(String),
    #[error("{0}")]
    CorrelationError(String),
    #[error("{0} is not supported by the Mollie payment method")]
    NotSupported(&'static str),
    #[error(transparent)]
    GatewayError(#[from] MollieClientError),
    #[error(transparent)]
    SettingError(#[from] SettingServiceError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<PaymentError> for GenericError {
    fn from(err: PaymentError) -> GenericError {
        match err {
            PaymentError::ValidationError(message) => GenericError::ValidationError(message),
            PaymentError::OrderNotFoundError(message) => GenericError::DataNotFoundError(message),
            PaymentError::CorrelationError(message) => GenericError::DataNotFoundError(message),
            PaymentError::NotSupported(operation) => GenericError::NotImplementedError(format!(
                "{} is not supported by the Mollie payment method",
                operation
            )),
            PaymentError::GatewayError(error) => GenericError::GatewayError(error.to_string()),
            PaymentError::SettingError(error) => {
                GenericError::UnexpectedCustomError(error.to_string())
            }
            PaymentError::UnexpectedError(error) => GenericError::UnexpectedError(error),
        }
    }
}
