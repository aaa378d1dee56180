use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client, Url};
use tracing::{debug, warn};

use super::error::FetchError;
use super::types::{ErrorResponse, Job, ScheduleResponse};
use super::ScheduleSource;
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct ScheduleClient {
    client: Client,
    base_url: String,
}

impl ScheduleClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        if !config.is_configured() {
            return Err(FetchError::Config("API base URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// `{base}/api/schedule?date=YYYY-MM-DD&_t=<token>`
    pub fn schedule_url(&self, date: NaiveDate, cache_buster: u128) -> Result<Url, FetchError> {
        let endpoint = format!("{}/api/schedule", self.base_url);
        Url::parse_with_params(
            &endpoint,
            &[
                ("date", date.format("%Y-%m-%d").to_string()),
                ("_t", cache_buster.to_string()),
            ],
        )
        .map_err(|e| FetchError::Config(format!("invalid base URL {}: {}", self.base_url, e)))
    }

    pub async fn get_day(&self, date: NaiveDate) -> Result<ScheduleResponse, FetchError> {
        let url = self.schedule_url(date, cache_buster())?;
        debug!(%url, "fetching schedule");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(status = status.as_u16(), %message, "schedule request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode_schedule(&body)
    }
}

pub(crate) fn decode_schedule(body: &str) -> Result<ScheduleResponse, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Unique per request so no intermediate cache can answer it
fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[async_trait]
impl ScheduleSource for ScheduleClient {
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Job>, FetchError> {
        let response = self.get_day(date).await?;
        if let Some(served) = response.date {
            if served != date {
                warn!(requested = %date, %served, "schedule server answered for a different date");
            }
        }
        Ok(response.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ScheduleClient {
        let config = Config {
            api_base_url: "ops.example.com/".to_string(),
            ..Config::default()
        };
        ScheduleClient::new(&config).unwrap()
    }

    #[test]
    fn requires_base_url() {
        let err = ScheduleClient::new(&Config::default()).err().unwrap();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn builds_cache_busted_url() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let url = client().schedule_url(date, 1_741_500_000_123).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ops.example.com/api/schedule?date=2025-03-09&_t=1741500000123"
        );
    }

    #[test]
    fn decode_failure_is_reported() {
        let err = decode_schedule("<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(!err.is_offline());
    }
}
