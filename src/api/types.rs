use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A scheduled job as delivered by the schedule endpoint.
///
/// Only `id`, `startTime` and `endTime` are interpreted. Everything else the
/// endpoint sends (customer, address, tags, crew, ...) is kept untouched in
/// `payload` for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "startTime", default, deserialize_with = "blank_as_none")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default, deserialize_with = "blank_as_none")]
    pub end_time: Option<String>,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl Job {
    pub fn new(id: &str, start_time: Option<&str>, end_time: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            start_time: start_time.map(String::from),
            end_time: end_time.map(String::from),
            payload: serde_json::Map::new(),
        }
    }

    /// A string field from the payload, if present and non-empty
    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Tags may arrive as an array or a comma separated string
    pub fn tags(&self) -> Vec<String> {
        match self.payload.get("tags") {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(serde_json::Value::String(s)) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Short label for the job card ("JOB #1042")
    pub fn title(&self) -> String {
        match self.text("serialId") {
            Some(serial) => format!("JOB #{}", serial),
            None => format!("JOB {}", self.id),
        }
    }
}

/// Successful body of `GET /api/schedule`
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub success: bool,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(rename = "totalJobs")]
    pub total_jobs: Option<usize>,
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn message(&self) -> Option<String> {
        match (&self.error, &self.details) {
            (Some(error), Some(details)) if !details.is_empty() => {
                Some(format!("{}: {}", error, details))
            }
            (Some(error), _) => Some(error.clone()),
            (None, Some(details)) => Some(details.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_schedule_response_and_keeps_payload() {
        let body = r#"{
            "success": true,
            "date": "2025-03-12",
            "totalJobs": 2,
            "jobs": [
                {"id": "u-1", "serialId": "1042", "startTime": "9:00 AM", "endTime": "11:00 AM",
                 "tags": ["Move", "3"], "fullAddress": "12 Elm St, Boise, ID"},
                {"id": "u-2", "startTime": "", "endTime": null, "tags": "OOT, Trk"}
            ]
        }"#;

        let response: ScheduleResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.date, NaiveDate::from_ymd_opt(2025, 3, 12));
        assert_eq!(response.total_jobs, Some(2));

        let first = &response.jobs[0];
        assert_eq!(first.start_time.as_deref(), Some("9:00 AM"));
        assert_eq!(first.title(), "JOB #1042");
        assert_eq!(first.tags(), vec!["Move", "3"]);
        assert_eq!(first.text("fullAddress"), Some("12 Elm St, Boise, ID"));
        assert!(!first.payload.contains_key("startTime"));

        let second = &response.jobs[1];
        assert_eq!(second.start_time, None);
        assert_eq!(second.end_time, None);
        assert_eq!(second.tags(), vec!["OOT", "Trk"]);
        assert_eq!(second.title(), "JOB u-2");
    }

    #[test]
    fn error_message_combines_fields() {
        let body = r#"{"error": "Failed to fetch jobs from Workiz", "details": "timeout"}"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.message().unwrap(), "Failed to fetch jobs from Workiz: timeout");
    }
}
