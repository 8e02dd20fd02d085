//! Raw calendar event records and the enriched event the page renders.
//!
//! The calendar API sends camelCase JSON; the raw shapes declare that mapping
//! explicitly so nothing depends on field-name guessing at runtime. The
//! enriched [`Event`] is what the rest of the pipeline and the templates see.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// An event exactly as the calendar API lists it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color_id: Option<String>,
    #[serde(default)]
    pub start: RawEventTime,
    #[serde(default)]
    pub end: RawEventTime,
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
}

/// Start or end of a raw event. The API sets exactly one of the two fields:
/// `date` for all-day events, `dateTime` for timed ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    pub date: Option<NaiveDate>,
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttachment {
    pub file_id: String,
    pub mime_type: String,
    #[serde(default)]
    pub title: String,
}

/// An attachment carried through onto the enriched event.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub file_id: String,
    pub mime_type: String,
    pub title: String,
}

impl Attachment {
    pub fn from_raw(raw: &RawAttachment) -> Self {
        Attachment {
            file_id: raw.file_id.clone(),
            mime_type: raw.mime_type.clone(),
            title: raw.title.clone(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A calendar event after enrichment.
///
/// Every derived field is a pure function of the raw record, the registries,
/// the display timezone and the batch clock, so re-running enrichment over
/// the same inputs reproduces the same page data.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Color id from the raw record, "0" when the event had none.
    pub color_id: String,
    /// Resolved category name, "misc" when the color maps to no category.
    pub category_name: String,
    pub css_classes: Vec<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub in_past: bool,
    pub has_location: bool,
    pub has_description: bool,
    pub is_over_zoom: bool,
    pub attachments: Vec<Attachment>,
    /// Local filename of the first image attachment, once fetched.
    pub cover_image_filename: Option<String>,
    /// Schedule cross-reference slug for match events ("atxvscin").
    pub match_slug: Option<String>,
}

impl Event {
    pub fn css_class(&self) -> String {
        format!("event-{}", self.id)
    }

    /// The attachment the page shows as this event's cover: the first one
    /// carrying an image mime type.
    pub fn cover_attachment(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|attachment| attachment.is_image())
    }

    /// Description split into lines for template rendering.
    pub fn description_lines(&self) -> Vec<&str> {
        self.description
            .as_deref()
            .map(|description| description.split('\n').collect())
            .unwrap_or_default()
    }
}
