use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, Error};
use futures::future::{ready, LocalBoxFuture, Ready};
use secrecy::ExposeSecret;

use crate::configuration::SecretSetting;
use crate::errors::GenericError;

/// Guards the admin configuration endpoints with the configured bearer
/// token. Stands in for the host framework's admin authorization.
pub struct RequireAdminAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAdminAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAdminAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let secret = req
                .app_data::<web::Data<SecretSetting>>()
                .ok_or_else(|| {
                    Error::from(GenericError::UnexpectedCustomError(
                        "Admin token is not configured".to_string(),
                    ))
                })?;
            let expected = format!("Bearer {}", secret.admin_api_token.expose_secret());
            let provided = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            if provided != expected {
                return Err(GenericError::UnauthorizedError(
                    "Invalid admin token".to_string(),
                )
                .into());
            }
            service.call(req).await
        })
    }
}
