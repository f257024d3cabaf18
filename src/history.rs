use async_trait::async_trait;
use log::{error, info, warn};
use postgrest::Postgrest;
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};

use crate::configuration::StoreSettings;
use crate::error::ForecastError;
use crate::models::DailyRecord;

/// Read-only access to the daily consumption documents.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Full, unordered scan. An empty collection is not an error here.
    async fn read_all_daily_records(&self) -> Result<Vec<DailyRecord>, ForecastError>;
}

/// Collection exposed through a PostgREST endpoint (e.g. Supabase).
pub struct PostgrestHistoryStore {
    client: Postgrest,
    collection: String,
    timeout: Duration,
}

impl PostgrestHistoryStore {
    pub fn new(settings: &StoreSettings) -> Self {
        let client = Postgrest::new(settings.uri.trim_end_matches('/'))
            .insert_header("apikey", settings.key.expose_secret());
        Self {
            client,
            collection: settings.collection.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    async fn scan(&self) -> Result<Vec<DailyRecord>, ForecastError> {
        let response = self
            .client
            .from(&self.collection)
            .select("*")
            .exact_count()
            .execute()
            .await
            .map_err(|e| ForecastError::Storage(format!("query failed: {}", e.without_url())))?;

        let status = response.status();
        let expected = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(total_from_content_range);
        let body = response
            .text()
            .await
            .map_err(|e| {
                ForecastError::Storage(format!("reading response failed: {}", e.without_url()))
            })?;
        if !status.is_success() {
            error!("Error in query status: {} -> {}", status, body);
            return Err(ForecastError::Storage(format!(
                "store answered {} for `{}`",
                status, self.collection
            )));
        }

        let records: Vec<DailyRecord> = serde_json::from_str(&body).map_err(|e| {
            ForecastError::Storage(format!("unexpected documents in `{}`: {}", self.collection, e))
        })?;

        // The server may cap rows per response; a partial history must not pass as complete.
        if let Some(total) = expected {
            if total != records.len() {
                warn!(
                    "{} holds {} documents but only {} were returned",
                    self.collection,
                    total,
                    records.len()
                );
                return Err(ForecastError::Storage(format!(
                    "incomplete scan of `{}`: {} of {} documents",
                    self.collection,
                    records.len(),
                    total
                )));
            }
        }
        Ok(records)
    }
}

/// Total row count from a PostgREST `Content-Range` header (`0-24/310`, `*/0`).
/// `None` when the server did not count.
fn total_from_content_range(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl HistoryStore for PostgrestHistoryStore {
    async fn read_all_daily_records(&self) -> Result<Vec<DailyRecord>, ForecastError> {
        let start = Instant::now();
        let records = tokio::time::timeout(self.timeout, self.scan())
            .await
            .map_err(|_| {
                ForecastError::Storage(format!(
                    "scan of `{}` timed out after {:?}",
                    self.collection, self.timeout
                ))
            })??;
        info!(
            "Read {} documents from {} in {:?}",
            records.len(),
            self.collection,
            start.elapsed()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_totals() {
        assert_eq!(total_from_content_range("0-24/310"), Some(310));
        assert_eq!(total_from_content_range("*/0"), Some(0));
        assert_eq!(total_from_content_range("0-9/*"), None);
        assert_eq!(total_from_content_range("garbage"), None);
    }
}
