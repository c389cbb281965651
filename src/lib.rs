//! Standalone adapter integrating the Mollie payment gateway into a store's
//! checkout flow: builds gateway order payloads, redirects customers to the
//! hosted checkout, processes webhook notifications and submits refunds.
pub mod configuration;
pub mod errors;
pub mod middleware;
pub mod mollie_client;
pub mod openapi;
pub mod order_store;
pub mod routes;
pub mod schemas;
pub mod setting_service;
pub mod startup;
pub mod telemetry;
pub mod utils;
