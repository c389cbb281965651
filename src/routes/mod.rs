pub mod payment;
pub mod settings;
pub mod util;

use actix_web::web;

use payment::payment_route;
use settings::settings_route;
use util::util_route;

pub fn main_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/payment").configure(payment_route))
        .service(web::scope("/settings").configure(settings_route))
        .service(web::scope("/util").configure(util_route));
}
