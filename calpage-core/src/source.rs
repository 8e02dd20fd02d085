//! Seam between the pipeline and whatever produces raw event records.
//!
//! The shipped implementation replays a JSON dump of the calendar API's list
//! response. The real HTTP client lives outside this crate; it already asks
//! the API for expanded single events ordered by start time, so records are
//! consumed here exactly in the order they arrive.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::error::{CalPageError, CalPageResult};
use crate::event::RawEvent;

/// Time window a fetch covers, in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl FetchWindow {
    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        FetchWindow { time_min, time_max }
    }

    /// Window of the given length starting at the current instant.
    pub fn starting_now(length: Duration) -> Self {
        let time_min = Utc::now();
        FetchWindow {
            time_min,
            time_max: time_min + length,
        }
    }
}

/// Produces the raw event records for a calendar and window.
pub trait EventSource {
    fn list_events(&self, calendar_id: &str, window: &FetchWindow) -> CalPageResult<Vec<RawEvent>>;
}

/// Replays a calendar API events dump from disk.
///
/// Accepts either the full list response (`{"items": [...]}`) or a bare
/// array of event records.
pub struct JsonFeed {
    path: PathBuf,
}

impl JsonFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFeed { path: path.into() }
    }
}

impl EventSource for JsonFeed {
    fn list_events(
        &self,
        _calendar_id: &str,
        _window: &FetchWindow,
    ) -> CalPageResult<Vec<RawEvent>> {
        let content = std::fs::read_to_string(&self.path)?;
        let parsed: Value = serde_json::from_str(&content)?;

        let items = match parsed {
            Value::Array(items) => items,
            Value::Object(mut response) => match response.remove("items") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(CalPageError::Source(format!(
                        "feed '{}' has no items array",
                        self.path.display()
                    )));
                }
            },
            _ => {
                return Err(CalPageError::Source(format!(
                    "feed '{}' is neither a list response nor an event array",
                    self.path.display()
                )));
            }
        };

        tracing::debug!(feed = %self.path.display(), count = items.len(), "replaying events dump");

        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(CalPageError::from))
            .collect()
    }
}
