use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::core::snapshot::RateSnapshot;
use crate::core::source::RateSource;

// OpenExchangeSource implementation for RateSource
pub struct OpenExchangeSource {
    base_url: String,
    app_id: String,
}

impl OpenExchangeSource {
    pub fn new(base_url: &str, app_id: &str) -> Self {
        OpenExchangeSource {
            base_url: base_url.to_string(),
            app_id: app_id.to_string(),
        }
    }
}

#[async_trait]
impl RateSource for OpenExchangeSource {
    #[instrument(name = "OpenExchangeFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateSnapshot> {
        let url = format!("{}/api/latest.json?app_id={}", self.base_url, self.app_id);
        debug!("Requesting latest rates from {}", self.base_url);

        let client = reqwest::Client::builder().user_agent("ratesd/0.1").build()?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for rate provider", e))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from rate provider",
                response.status()
            ));
        }

        let text = response.text().await?;

        let snapshot: RateSnapshot = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rate provider response: {}", e))?;

        debug!(base = %snapshot.base, count = snapshot.rates.len(), "Decoded rate snapshot");

        Ok(snapshot)
    }
}
