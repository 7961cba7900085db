use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Minimal block-explorer client (mempool.space API shape), used to resolve
/// the actual transaction count of a round's target block.
pub struct ExplorerClient {
    api_url: String,
    client: reqwest::Client,
    max_attempts: u32,
    backoff_base: Duration,
}

/// Block summary as returned by the explorer. Timestamps are seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockSummary {
    #[serde(rename = "id")]
    pub hash: String,
    pub height: u64,
    pub timestamp: i64,
    pub tx_count: u64,
}

impl ExplorerClient {
    pub fn new(
        api_url: &str,
        max_attempts: u32,
        backoff_base_ms: u64,
        request_timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
            max_attempts: max_attempts.max(1),
            backoff_base: Duration::from_millis(backoff_base_ms),
        })
    }

    /// First block mined at or after the given timestamp (seconds).
    pub async fn block_at_time(&self, timestamp_secs: i64) -> Result<BlockSummary> {
        let url = format!("{}/v1/mining/blocks/timestamp/{timestamp_secs}", self.api_url);
        self.with_retry(|| async {
            debug!(url = %url, "fetching block at timestamp");
            let blocks: Vec<BlockSummary> = self.get_json(&url).await?;
            blocks
                .into_iter()
                .next()
                .with_context(|| format!("no blocks found after timestamp {timestamp_secs}"))
        })
        .await
    }

    /// Hash of the block at the given height. The endpoint returns plain text.
    pub async fn block_hash_at_height(&self, height: u64) -> Result<String> {
        let url = format!("{}/block-height/{height}", self.api_url);
        self.with_retry(|| async {
            debug!(url = %url, "fetching block hash at height");
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("explorer returned {status} for height {height}");
            }
            Ok(resp.text().await?.trim().to_string())
        })
        .await
    }

    /// Transaction count for a block, derived from its txid list.
    pub async fn tx_count(&self, block_hash: &str) -> Result<u64> {
        let url = format!("{}/block/{block_hash}/txids", self.api_url);
        self.with_retry(|| async {
            debug!(url = %url, "fetching block txids");
            let txids: Vec<String> = self.get_json(&url).await?;
            Ok(txids.len() as u64)
        })
        .await
    }

    /// Most recently mined blocks, newest first.
    pub async fn recent_blocks(&self, limit: usize) -> Result<Vec<BlockSummary>> {
        let url = format!("{}/blocks", self.api_url);
        let mut blocks: Vec<BlockSummary> = self
            .with_retry(|| async {
                debug!(url = %url, "fetching recent blocks");
                self.get_json(&url).await
            })
            .await?;
        blocks.truncate(limit);
        Ok(blocks)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("explorer returned {status}: {body}");
        }
        Ok(resp.json().await?)
    }

    /// Linear-backoff retry: sleep `backoff_base * attempt` between attempts.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    warn!(attempt, error = %e, "explorer request failed");
                    last_err = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff_base * attempt).await;
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow::anyhow!("explorer request failed with no attempts made")))
    }
}
