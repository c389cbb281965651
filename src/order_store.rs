use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::routes::payment::schemas::{Order, PaymentStatus};
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum OrderStoreError {
    #[error("No order found for order number {0}")]
    UnknownOrder(String),
}

impl std::fmt::Debug for OrderStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Access to the host framework's order repository. The adapter only ever
/// correlates by merchant order number and flips the payment status.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn order_by_number(&self, order_number: &str) -> Option<Order>;

    async fn save_order(&self, order: Order);

    async fn update_payment_status(
        &self,
        order_number: &str,
        status: PaymentStatus,
    ) -> Result<(), OrderStoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn order_by_number(&self, order_number: &str) -> Option<Order> {
        self.orders.read().await.get(order_number).cloned()
    }

    async fn save_order(&self, order: Order) {
        self.orders
            .write()
            .await
            .insert(order.order_number.clone(), order);
    }

    async fn update_payment_status(
        &self,
        order_number: &str,
        status: PaymentStatus,
    ) -> Result<(), OrderStoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_number)
            .ok_or_else(|| OrderStoreError::UnknownOrder(order_number.to_string()))?;
        order.payment_status = status;
        Ok(())
    }
}
