pub mod errors;
pub mod handlers;
mod routes;
pub mod schemas;

pub use routes::settings_route;
