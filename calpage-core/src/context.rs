//! The render context handed to the external template renderer.
//!
//! Everything the page templates and the scss vars template consume is
//! collected here and serialized as one JSON document. Maps are ordered and
//! sets are sorted at this boundary so the same inputs always produce the
//! same bytes.

use std::collections::{BTreeMap, HashSet};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::Calendar;
use crate::event::Event;
use crate::images::ImageStore;
use crate::settings::Settings;

#[derive(Debug, Serialize)]
pub struct RenderContext {
    pub base_url: String,
    pub calendar_id: String,
    pub calendar_embed_href: String,
    pub calendar_cid_href: String,
    pub display_timezone: String,
    pub last_refresh: Option<DateTime<Tz>>,
    pub events: Vec<Event>,
    pub default_category_names: Vec<String>,
    pub current_category_names: Vec<String>,
    pub additional_category_names: Vec<String>,
    pub empty_category_names: Vec<String>,
    pub style: StyleVars,
}

/// Values templated into the page's scss vars.
///
/// The image and color maps are keyed by css class (`category-{color_id}`
/// for categories, `event-{id}` for single events).
#[derive(Debug, Serialize)]
pub struct StyleVars {
    pub background_images: BTreeMap<String, String>,
    pub background_colors: BTreeMap<String, String>,
    pub text_fg_colors: BTreeMap<String, String>,
    pub text_bg_colors: BTreeMap<String, String>,
    pub team_colors: BTreeMap<String, String>,
}

impl RenderContext {
    /// Collect the page data for a loaded calendar.
    ///
    /// The store is consulted for already-downloaded category covers; events
    /// carry their own cover filenames.
    pub fn build(calendar: &Calendar, settings: &Settings, store: &ImageStore) -> Self {
        RenderContext {
            base_url: settings.base_url(),
            calendar_id: calendar.calendar_id.clone(),
            calendar_embed_href: calendar.embed_href(),
            calendar_cid_href: calendar.cid_href(),
            display_timezone: calendar.display_tz().to_string(),
            last_refresh: calendar.last_refresh(),
            events: calendar.events().to_vec(),
            default_category_names: sorted(calendar.default_category_names()),
            current_category_names: sorted(calendar.current_category_names()),
            additional_category_names: sorted(calendar.additional_category_names()),
            empty_category_names: sorted(calendar.empty_category_names()),
            style: StyleVars::build(calendar, store),
        }
    }

    pub fn to_json(&self) -> crate::error::CalPageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl StyleVars {
    fn build(calendar: &Calendar, store: &ImageStore) -> Self {
        let mut background_images = BTreeMap::new();
        let mut background_colors = BTreeMap::new();
        let mut text_fg_colors = BTreeMap::new();
        let mut text_bg_colors = BTreeMap::new();

        for category in calendar.categories().definitions() {
            let class = category.css_class();

            if let Some(filename) = category.cover_file_id().and_then(|id| store.find_by_id(id))
            {
                background_images.insert(class.clone(), filename);
            }
            if let Some(color) = &category.bg_color {
                background_colors.insert(class.clone(), color.clone());
            }
            if let Some(color) = &category.text_fg_color {
                text_fg_colors.insert(class.clone(), color.clone());
            }
            if let Some(color) = &category.text_bg_color {
                text_bg_colors.insert(class, color.clone());
            }
        }

        // Per-event covers land in the same image map as category covers,
        // keyed by the event's own class.
        for event in calendar.events() {
            if let Some(filename) = &event.cover_image_filename {
                background_images.insert(event.css_class(), filename.clone());
            }
        }

        StyleVars {
            background_images,
            background_colors,
            text_fg_colors,
            text_bg_colors,
            team_colors: calendar.teams().colors_by_abbr(),
        }
    }
}

fn sorted(names: HashSet<String>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names
}
