//! Calendar aggregate: enriched events plus the filter sets derived from them.

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::category::CategoryMap;
use crate::colors::ColorRegistry;
use crate::enrich::Enricher;
use crate::error::CalPageResult;
use crate::event::Event;
use crate::settings::Settings;
use crate::source::{EventSource, FetchWindow};
use crate::teams::{Club, TeamRegistry};

/// One calendar's worth of page data.
///
/// Events are fetched at most once per instance: the first `load_events`
/// call owns the fetch, later calls return the cached batch. Callers that
/// want fresh data build a fresh `Calendar`.
pub struct Calendar {
    pub calendar_id: String,
    display_tz: Tz,
    categories: CategoryMap,
    teams: TeamRegistry,
    club: Club,
    window: FetchWindow,
    events: Option<Vec<Event>>,
    last_refresh: Option<DateTime<Tz>>,
}

impl Calendar {
    pub fn new(settings: &Settings, window: FetchWindow) -> CalPageResult<Self> {
        let colors = ColorRegistry::default();
        Ok(Calendar {
            calendar_id: settings.calendar_id.clone(),
            display_tz: settings.display_tz()?,
            categories: CategoryMap::from_settings(&settings.event_categories, &colors)?,
            teams: TeamRegistry::from_settings(settings.teams.as_ref())?,
            club: settings.club(),
            window,
            events: None,
            last_refresh: None,
        })
    }

    /// Fetch and enrich the calendar's events, memoized per instance.
    ///
    /// Any event in the batch failing enrichment fails the whole load and
    /// caches nothing, so a later call retries from scratch.
    pub fn load_events(&mut self, source: &dyn EventSource) -> CalPageResult<&[Event]> {
        if self.events.is_none() {
            let now = Utc::now().with_timezone(&self.display_tz);
            tracing::info!(
                calendar_id = %self.calendar_id,
                time_min = %self.window.time_min,
                time_max = %self.window.time_max,
                "loading events"
            );

            let raw_events = source.list_events(&self.calendar_id, &self.window)?;
            let enricher =
                Enricher::new(&self.categories, &self.teams, self.display_tz, self.club.clone())
                    .with_now(now);
            let events = raw_events
                .iter()
                .map(|raw| enricher.enrich(raw))
                .collect::<CalPageResult<Vec<Event>>>()?;

            tracing::debug!(count = events.len(), "enriched events");
            self.events = Some(events);
            self.last_refresh = Some(now);
        }

        Ok(self.events.as_deref().unwrap_or_default())
    }

    /// Enriched events, empty before the first successful load.
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Tz>> {
        self.last_refresh
    }

    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    // Filter sets are unordered here; anything user-facing sorts at the
    // boundary.

    /// Categories always offered as filters, regardless of loaded events.
    pub fn default_category_names(&self) -> HashSet<String> {
        self.categories.default_names()
    }

    /// Distinct category names among the loaded events.
    pub fn current_category_names(&self) -> HashSet<String> {
        self.events()
            .iter()
            .map(|event| event.category_name.clone())
            .collect()
    }

    /// Categories seen in events but not pinned as defaults.
    pub fn additional_category_names(&self) -> HashSet<String> {
        &self.current_category_names() - &self.default_category_names()
    }

    /// Offered categories that currently have no events.
    pub fn empty_category_names(&self) -> HashSet<String> {
        let current = self.current_category_names();
        &(&self.default_category_names() | &current) - &current
    }

    /// Share-link calendar id: base64 of the id with padding stripped.
    pub fn cid(&self) -> String {
        BASE64
            .encode(self.calendar_id.as_bytes())
            .trim_end_matches('=')
            .to_string()
    }

    pub fn embed_href(&self) -> String {
        format!(
            "https://calendar.google.com/calendar/embed?src={}",
            urlencoding::encode(&self.calendar_id)
        )
    }

    pub fn cid_href(&self) -> String {
        format!("https://calendar.google.com/calendar/u/0?cid={}", self.cid())
    }
}
