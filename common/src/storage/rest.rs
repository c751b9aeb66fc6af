// PostgREST order store client

use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::models::OrderSummary;
use crate::storage::OrderStore;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Columns the reminder job needs from an order row
const SELECT_COLUMNS: &str = "id,status,expected_date,applicant_name,phone";

/// Reads pending orders through the backend's REST interface
pub struct RestOrderStore {
    client: Client,
    endpoint: String,
    api_key: String,
    pending_status: String,
    order_type: Option<String>,
}

impl RestOrderStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                StoreError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = config.base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(StoreError::Configuration(
                "Store base_url cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url, config.table),
            api_key: config.api_key.clone(),
            pending_status: config.pending_status.clone(),
            order_type: Some(config.order_type.clone()).filter(|t| !t.is_empty()),
        })
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", SELECT_COLUMNS.to_string()),
            ("status", format!("eq.{}", self.pending_status)),
        ];
        if let Some(order_type) = &self.order_type {
            params.push(("type", format!("eq.{}", order_type)));
        }
        params
    }
}

#[async_trait]
impl OrderStore for RestOrderStore {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn pending_reservations(&self) -> Result<Vec<OrderSummary>, StoreError> {
        debug!(status = %self.pending_status, "Querying pending reservations");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Order store query failed");
            return Err(StoreError::QueryFailed {
                status: status.as_u16(),
                body,
            });
        }

        let orders: Vec<OrderSummary> = response
            .json()
            .await
            .map_err(|e| StoreError::DecodeFailed(e.to_string()))?;

        info!(count = orders.len(), "Loaded pending reservations");
        Ok(orders)
    }
}
