use actix_web::web;

use super::handlers::{get_settings, save_settings};
use crate::middleware::RequireAdminAuth;

pub fn settings_route(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(get_settings))
            .route(web::post().to(save_settings))
            .wrap(RequireAdminAuth),
    );
}
