pub mod handlers;

use actix_web::web;

use handlers::health_check;

pub fn util_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health_check").route(web::get().to(health_check)));
}
