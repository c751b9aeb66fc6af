// SMS delivery
//
// Gateways report success or failure per message; there is no retry here.

pub mod signature;
pub mod solapi;

pub use solapi::SolapiGateway;

use crate::errors::SmsError;
use async_trait::async_trait;

/// Fire-and-forget SMS delivery
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `text` to `to`
    async fn send(&self, to: &str, text: &str) -> Result<(), SmsError>;
}

/// Log-only gateway
///
/// Logs every message at INFO level and reports success without sending
/// anything. Used for dry runs.
pub struct LogGateway;

#[async_trait]
impl SmsGateway for LogGateway {
    #[tracing::instrument(skip(self, text))]
    async fn send(&self, to: &str, text: &str) -> Result<(), SmsError> {
        tracing::info!(to = to, text = text, "SMS not sent (log only)");
        Ok(())
    }
}
