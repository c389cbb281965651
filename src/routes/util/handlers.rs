use actix_web::web;
use utoipa::TupleUnit;

use crate::schemas::GenericResponse;

#[utoipa::path(
    get,
    path = "/util/health_check",
    tag = "Util",
    responses((status=200, description= "Service is up", body= GenericResponse<TupleUnit>))
)]
pub async fn health_check() -> web::Json<GenericResponse<()>> {
    web::Json(GenericResponse::success("Running", Some(())))
}
