mod health_check;
mod helpers;
mod payment;
mod settings;
