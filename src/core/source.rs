//! Upstream rate source abstraction.

use crate::core::snapshot::RateSnapshot;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateSnapshot>;
}
