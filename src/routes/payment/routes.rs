use actix_web::web;

use super::handlers::{
    cancel_recurring, capture, checkout, process_recurring, refund, void, webhook,
};

pub fn payment_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/checkout").route(web::post().to(checkout)));
    cfg.service(web::resource("/webhook").route(web::post().to(webhook)));
    cfg.service(web::resource("/refund").route(web::post().to(refund)));
    cfg.service(web::resource("/capture").route(web::post().to(capture)));
    cfg.service(web::resource("/void").route(web::post().to(void)));
    cfg.service(web::resource("/recurring/process").route(web::post().to(process_recurring)));
    cfg.service(web::resource("/recurring/cancel").route(web::post().to(cancel_recurring)));
}
