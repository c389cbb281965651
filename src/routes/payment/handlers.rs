use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse, ResponseError};
use utoipa::TupleUnit;

use super::errors::PaymentError;
use super::schemas::{CheckoutData, CheckoutRequest, PaymentStatus, RefundData, RefundRequest, WebhookParams};
use super::utils::{
    build_order_request, build_refund_lines, derive_refund_status, find_gateway_order_id,
    WebhookDedup,
};
use crate::configuration::ApplicationSettings;
use crate::errors::GenericError;
use crate::mollie_client::{resolve_api_key, MollieGateway, MollieOrderRefundRequest};
use crate::order_store::OrderStore;
use crate::schemas::GenericResponse;
use crate::setting_service::{SettingService, ALL_STORES_SCOPE};

#[utoipa::path(
    post,
    path = "/payment/checkout",
    tag = "Payment",
    description = "Builds a Mollie order for the given store order and redirects to the gateway checkout page.",
    summary = "Checkout Redirect Request",
    request_body(content = CheckoutRequest, description = "Request Body"),
    responses(
        (status=303, description= "Redirect to the gateway checkout", body= GenericResponse<CheckoutData>),
        (status=400, description= "Invalid Request body", body= GenericResponse<TupleUnit>),
        (status=410, description= "Data not found", body= GenericResponse<TupleUnit>),
        (status=502, description= "Gateway call failed", body= GenericResponse<TupleUnit>),
        (status=500, description= "Internal Server Error", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(
    name = "checkout redirect",
    skip(gateway, order_store, setting_service, application),
    fields(order_number = %body.order_number)
)]
pub async fn checkout(
    body: CheckoutRequest,
    gateway: web::Data<Arc<dyn MollieGateway>>,
    order_store: web::Data<Arc<dyn OrderStore>>,
    setting_service: web::Data<SettingService>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, GenericError> {
    let store_scope = body.store_id.unwrap_or(ALL_STORES_SCOPE);
    let settings = setting_service
        .load_setting(store_scope)
        .map_err(PaymentError::from)?;

    let order = order_store
        .order_by_number(&body.order_number)
        .await
        .ok_or_else(|| PaymentError::OrderNotFoundError(body.order_number.clone()))?;

    let order_request = build_order_request(&order, application.currency, &application.base_url)?;

    let keys = settings.api_keys();
    let api_key = resolve_api_key(settings.use_sandbox, &keys);
    let order_response = gateway
        .create_order(api_key, &order_request)
        .await
        .map_err(PaymentError::from)?;

    let checkout_url = order_response
        .links
        .checkout
        .as_ref()
        .map(|link| link.href.clone())
        .ok_or_else(|| {
            PaymentError::UnexpectedError(anyhow::anyhow!(
                "Gateway response carried no checkout link"
            ))
        })?;

    order_store
        .update_payment_status(&order.order_number, PaymentStatus::AwaitingGatewayRedirect)
        .await
        .map_err(|e| PaymentError::UnexpectedError(anyhow::Error::new(e)))?;

    tracing::info!(gateway_order_id = %order_response.id, "Redirecting customer to the gateway checkout.");
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, checkout_url.clone()))
        .json(GenericResponse::success(
            "Redirecting to the Mollie checkout",
            Some(CheckoutData {
                checkout_url,
                gateway_order_id: order_response.id,
            }),
        )))
}

pub(super) enum WebhookOutcome {
    Applied { order_number: String },
    AlreadyProcessed,
    NotPaid,
}

pub(super) async fn process_webhook(
    gateway_order_id: &str,
    gateway: &dyn MollieGateway,
    order_store: &dyn OrderStore,
    setting_service: &SettingService,
    dedup: &WebhookDedup,
) -> Result<WebhookOutcome, PaymentError> {
    let settings = setting_service.load_setting(ALL_STORES_SCOPE)?;
    let keys = settings.api_keys();
    let api_key = resolve_api_key(settings.use_sandbox, &keys);

    let gateway_order = gateway.get_order(api_key, gateway_order_id).await?;
    if !gateway_order.status.is_paid() {
        tracing::info!(status = ?gateway_order.status, "Gateway order is not paid; nothing to apply.");
        return Ok(WebhookOutcome::NotPaid);
    }

    let dedup_key = format!("{}:{:?}", gateway_order.id, gateway_order.status);
    if dedup.already_processed(&dedup_key) {
        return Ok(WebhookOutcome::AlreadyProcessed);
    }

    let order = order_store
        .order_by_number(&gateway_order.order_number)
        .await
        .ok_or_else(|| {
            PaymentError::CorrelationError(format!(
                "No local order matches gateway order number {}",
                gateway_order.order_number
            ))
        })?;
    if order.payment_status == PaymentStatus::Paid {
        dedup.mark_processed(dedup_key);
        return Ok(WebhookOutcome::AlreadyProcessed);
    }

    order_store
        .update_payment_status(&order.order_number, PaymentStatus::Paid)
        .await
        .map_err(|e| PaymentError::UnexpectedError(anyhow::Error::new(e)))?;
    // recorded only once the update landed; a failed notification stays
    // replayable
    dedup.mark_processed(dedup_key);
    Ok(WebhookOutcome::Applied {
        order_number: order.order_number,
    })
}

#[utoipa::path(
    post,
    path = "/payment/webhook",
    tag = "Payment",
    description = "Gateway-initiated notification of a payment status change. Always answers 200 OK; failures are reported in the body only.",
    summary = "Mollie Webhook",
    params(("id" = String, Query, description = "Gateway order id")),
    responses(
        (status=200, description= "Notification acknowledged", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(
    name = "mollie webhook",
    skip(gateway, order_store, setting_service, dedup),
    fields(gateway_order_id = %params.id)
)]
pub async fn webhook(
    params: web::Query<WebhookParams>,
    gateway: web::Data<Arc<dyn MollieGateway>>,
    order_store: web::Data<Arc<dyn OrderStore>>,
    setting_service: web::Data<SettingService>,
    dedup: web::Data<WebhookDedup>,
) -> HttpResponse {
    let outcome = process_webhook(
        &params.id,
        gateway.get_ref().as_ref(),
        order_store.get_ref().as_ref(),
        setting_service.get_ref(),
        dedup.get_ref(),
    )
    .await;

    // The gateway only needs an acknowledgement; errors never surface as
    // HTTP failures here.
    match outcome {
        Ok(WebhookOutcome::Applied { order_number }) => {
            tracing::info!(%order_number, "Order marked as paid.");
            HttpResponse::Ok().json(GenericResponse::success(
                "Payment status updated",
                Some(()),
            ))
        }
        Ok(WebhookOutcome::AlreadyProcessed) => HttpResponse::Ok().json(
            GenericResponse::success("Notification already processed", Some(())),
        ),
        Ok(WebhookOutcome::NotPaid) => HttpResponse::Ok().json(GenericResponse::success(
            "No payment state change",
            Some(()),
        )),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to process webhook notification");
            let code = GenericError::from(e).status_code();
            HttpResponse::Ok().json(GenericResponse::<()>::error(
                "Failed to process webhook notification",
                code.as_str(),
                Some(()),
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/payment/refund",
    tag = "Payment",
    description = "Refunds a paid order by matching it against the gateway order list and submitting an order refund.",
    summary = "Refund Request",
    request_body(content = RefundRequest, description = "Request Body"),
    responses(
        (status=200, description= "Refund submitted", body= GenericResponse<RefundData>),
        (status=400, description= "Invalid Request body", body= GenericResponse<TupleUnit>),
        (status=410, description= "No matching order", body= GenericResponse<TupleUnit>),
        (status=502, description= "Gateway call failed", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(
    name = "order refund",
    skip(gateway, order_store, setting_service),
    fields(order_number = %body.order_number)
)]
pub async fn refund(
    body: RefundRequest,
    gateway: web::Data<Arc<dyn MollieGateway>>,
    order_store: web::Data<Arc<dyn OrderStore>>,
    setting_service: web::Data<SettingService>,
) -> Result<web::Json<GenericResponse<RefundData>>, GenericError> {
    let store_scope = body.store_id.unwrap_or(ALL_STORES_SCOPE);
    let settings = setting_service
        .load_setting(store_scope)
        .map_err(PaymentError::from)?;
    let keys = settings.api_keys();
    let api_key = resolve_api_key(settings.use_sandbox, &keys);

    let order = order_store
        .order_by_number(&body.order_number)
        .await
        .ok_or_else(|| PaymentError::OrderNotFoundError(body.order_number.clone()))?;

    let gateway_orders = gateway
        .list_orders(api_key)
        .await
        .map_err(PaymentError::from)?;
    let gateway_order_id = find_gateway_order_id(&gateway_orders, &order.order_number)?;

    let gateway_order = gateway
        .get_order(api_key, &gateway_order_id)
        .await
        .map_err(PaymentError::from)?;

    let refund_request = MollieOrderRefundRequest {
        lines: build_refund_lines(&order, &gateway_order.lines),
        description: Some(format!("Refund for order {}", order.order_number)),
    };
    let refund_response = gateway
        .create_order_refund(api_key, &gateway_order_id, &refund_request)
        .await
        .map_err(PaymentError::from)?;

    let status = derive_refund_status(&refund_response.amount, &gateway_order.amount);
    let expected = if body.is_partial_refund {
        PaymentStatus::PartiallyRefunded
    } else {
        PaymentStatus::Refunded
    };
    if status != expected {
        tracing::warn!(
            derived = ?status,
            requested = ?expected,
            "Refund status derived from the gateway response disagrees with the caller flag."
        );
    }

    order_store
        .update_payment_status(&order.order_number, status)
        .await
        .map_err(|e| PaymentError::UnexpectedError(anyhow::Error::new(e)))?;

    Ok(web::Json(GenericResponse::success(
        "Refund submitted to the gateway",
        Some(RefundData {
            order_number: order.order_number,
            refund_id: refund_response.id,
            status,
        }),
    )))
}

// The gateway integration never supported these capabilities; each call
// answers deterministically without touching the network.

#[utoipa::path(
    post,
    path = "/payment/capture",
    tag = "Payment",
    responses((status=501, description= "Not supported", body= GenericResponse<TupleUnit>))
)]
#[tracing::instrument(name = "capture payment")]
pub async fn capture() -> Result<web::Json<GenericResponse<()>>, GenericError> {
    Err(PaymentError::NotSupported("Capture").into())
}

#[utoipa::path(
    post,
    path = "/payment/void",
    tag = "Payment",
    responses((status=501, description= "Not supported", body= GenericResponse<TupleUnit>))
)]
#[tracing::instrument(name = "void payment")]
pub async fn void() -> Result<web::Json<GenericResponse<()>>, GenericError> {
    Err(PaymentError::NotSupported("Void").into())
}

#[utoipa::path(
    post,
    path = "/payment/recurring/process",
    tag = "Payment",
    responses((status=501, description= "Not supported", body= GenericResponse<TupleUnit>))
)]
#[tracing::instrument(name = "process recurring payment")]
pub async fn process_recurring() -> Result<web::Json<GenericResponse<()>>, GenericError> {
    Err(PaymentError::NotSupported("Recurring payment").into())
}

#[utoipa::path(
    post,
    path = "/payment/recurring/cancel",
    tag = "Payment",
    responses((status=501, description= "Not supported", body= GenericResponse<TupleUnit>))
)]
#[tracing::instrument(name = "cancel recurring payment")]
pub async fn cancel_recurring() -> Result<web::Json<GenericResponse<()>>, GenericError> {
    Err(PaymentError::NotSupported("Recurring payment cancellation").into())
}
