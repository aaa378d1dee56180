mod client;
mod error;
mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::ScheduleClient;
pub use error::FetchError;
pub use types::*;

/// Anything that can supply the job list for a calendar date
#[async_trait]
pub trait ScheduleSource: Send + Sync + 'static {
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Job>, FetchError>;
}
