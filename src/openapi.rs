use utoipa::OpenApi;
use utoipauto::utoipauto;

#[utoipauto]
#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "Mollie Payments REST API", description = "Mollie payment plugin API Endpoints")
    ),
)]
pub struct ApiDoc {}
