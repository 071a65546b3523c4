use async_trait::async_trait;

use crate::error::Result;

/// Anything that can run a saved query and hand back display rows.
#[async_trait]
pub trait TicketSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// One pre-formatted row per matching issue, in result order.
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}
