// Order store access
//
// The reminder job only ever reads pending reserve orders; writes belong to
// the storefront and admin screens.

pub mod rest;

pub use rest::RestOrderStore;

use crate::errors::StoreError;
use crate::models::OrderSummary;
use async_trait::async_trait;

/// Read-only view of the order store
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders currently waiting for their reserve date, in one call
    async fn pending_reservations(&self) -> Result<Vec<OrderSummary>, StoreError>;
}

/// Fixed set of orders, used in tests
#[derive(Debug, Clone, Default)]
pub struct StaticOrderStore {
    orders: Vec<OrderSummary>,
}

impl StaticOrderStore {
    pub fn new(orders: Vec<OrderSummary>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderStore for StaticOrderStore {
    async fn pending_reservations(&self) -> Result<Vec<OrderSummary>, StoreError> {
        Ok(self.orders.clone())
    }
}
