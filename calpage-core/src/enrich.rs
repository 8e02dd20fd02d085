//! Turns raw calendar records into enriched page events.
//!
//! Enrichment is deterministic: the enricher captures one clock reading when
//! it is built and every event in the batch is judged against it, so a page
//! render can never disagree with itself about which events are in the past.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::{CategoryMap, FALLBACK_CATEGORY};
use crate::colors::UNSET_COLOR_ID;
use crate::error::{CalPageError, CalPageResult};
use crate::event::{Attachment, Event, RawEvent, RawEventTime};
use crate::images;
use crate::teams::{Club, TeamRegistry, UNKNOWN_TEAM_ABBR};

static ZOOM_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[A-Za-z0-9]+\.zoom\.us/").expect("zoom location pattern")
});

static MATCH_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<first>.+?)\s+(?P<vsat>vs|at)\s+(?P<second>.+)$")
        .expect("match title pattern")
});

/// Enriches raw events against the configured registries.
pub struct Enricher<'a> {
    categories: &'a CategoryMap,
    teams: &'a TeamRegistry,
    display_tz: Tz,
    now: DateTime<Tz>,
    club: Club,
}

impl<'a> Enricher<'a> {
    pub fn new(
        categories: &'a CategoryMap,
        teams: &'a TeamRegistry,
        display_tz: Tz,
        club: Club,
    ) -> Self {
        Enricher {
            categories,
            teams,
            display_tz,
            now: Utc::now().with_timezone(&display_tz),
            club,
        }
    }

    /// Pin the batch clock, mainly so a caller can reuse the exact reading
    /// it records as the refresh time.
    pub fn with_now(mut self, now: DateTime<Tz>) -> Self {
        self.now = now;
        self
    }

    pub fn enrich(&self, raw: &RawEvent) -> CalPageResult<Event> {
        let color_id = raw
            .color_id
            .clone()
            .unwrap_or_else(|| UNSET_COLOR_ID.to_string());
        let category_name = self
            .categories
            .by_color_id(&color_id)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

        let start = self.event_time(&raw.start, "start", &raw.id)?;
        let end = self.event_time(&raw.end, "end", &raw.id)?;

        let attachments: Vec<Attachment> =
            raw.attachments.iter().map(Attachment::from_raw).collect();
        // Only the first image attachment becomes the cover. An unknown mime
        // there fails the batch rather than producing an image nothing can
        // name on disk; later attachments are not the cover and never fail.
        let cover_image_filename = attachments
            .iter()
            .find(|attachment| attachment.is_image())
            .map(|cover| images::local_filename(&cover.file_id, &cover.mime_type))
            .transpose()?;

        let css_classes = vec![format!("category-{color_id}"), format!("event-{}", raw.id)];
        let is_over_zoom = raw
            .location
            .as_deref()
            .is_some_and(|location| ZOOM_LOCATION.is_match(location));

        Ok(Event {
            id: raw.id.clone(),
            summary: raw.summary.clone(),
            description: raw.description.clone(),
            location: raw.location.clone(),
            color_id,
            category_name,
            css_classes,
            in_past: start < self.now,
            start,
            end,
            has_location: raw.location.as_deref().is_some_and(|s| !s.is_empty()),
            has_description: raw.description.as_deref().is_some_and(|s| !s.is_empty()),
            is_over_zoom,
            attachments,
            cover_image_filename,
            match_slug: self.match_slug(&raw.summary),
        })
    }

    /// Localize a raw start/end into the display timezone.
    ///
    /// Wall-clock fields are kept as written and only relabeled: an event
    /// entered as 19:00 displays as 19:00 no matter which offset the API
    /// attached. All-day dates become midnight in the display timezone.
    fn event_time(
        &self,
        time: &RawEventTime,
        field: &str,
        event_id: &str,
    ) -> CalPageResult<DateTime<Tz>> {
        let naive = match (&time.date_time, &time.date) {
            (Some(stamp), _) => parse_wall_clock(stamp).ok_or_else(|| {
                CalPageError::Event(format!(
                    "event '{event_id}' has unparseable {field} timestamp '{stamp}'"
                ))
            })?,
            (None, Some(date)) => date.and_time(NaiveTime::MIN),
            (None, None) => {
                return Err(CalPageError::Event(format!(
                    "event '{event_id}' is missing its {field} timestamp"
                )));
            }
        };

        // Ambiguous wall clocks (DST fold) take the earlier reading;
        // nonexistent ones (DST gap) are data errors.
        naive
            .and_local_timezone(self.display_tz)
            .earliest()
            .ok_or_else(|| {
                CalPageError::Event(format!(
                    "event '{event_id}' {field} '{naive}' does not exist in {}",
                    self.display_tz
                ))
            })
    }

    /// Derive the schedule slug for match-style titles.
    ///
    /// "<home> vs <away>" and "<away> at <home>" both resolve to
    /// `{home}vs{away}` abbreviations. Titles that name the configured club
    /// on neither side are not matches.
    fn match_slug(&self, summary: &str) -> Option<String> {
        let caps = MATCH_TITLE.captures(summary.trim())?;
        let first = caps.name("first")?.as_str().trim();
        let second = caps.name("second")?.as_str().trim();

        let (home, away) = match caps.name("vsat")?.as_str() {
            "vs" => (first, second),
            _ => (second, first),
        };

        if !home.eq_ignore_ascii_case(&self.club.name) && !away.eq_ignore_ascii_case(&self.club.name)
        {
            return None;
        }

        Some(format!("{}vs{}", self.team_abbr(home), self.team_abbr(away)))
    }

    fn team_abbr(&self, name: &str) -> String {
        if name.eq_ignore_ascii_case(&self.club.name) {
            return self.club.abbr.clone();
        }
        self.teams
            .abbr_for(name)
            .unwrap_or(UNKNOWN_TEAM_ABBR)
            .to_string()
    }
}

fn parse_wall_clock(stamp: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(stamp)
        .map(|parsed| parsed.naive_local())
        .ok()
        .or_else(|| stamp.parse::<NaiveDateTime>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryConfig;
    use crate::colors::ColorRegistry;
    use chrono::TimeZone;
    use chrono_tz::US::Central;
    use std::collections::HashMap;

    fn home_game_categories() -> CategoryMap {
        let categories = HashMap::from([(
            "home-games".to_string(),
            CategoryConfig {
                gcal_color_name: "blueberry".to_string(),
                always_shown_in_filters: true,
                default_cover_image: None,
                bg_color: None,
                text_fg_color: None,
                text_bg_color: None,
            },
        )]);
        CategoryMap::from_settings(&categories, &ColorRegistry::default())
            .expect("test categories should build")
    }

    fn test_now() -> DateTime<Tz> {
        Central
            .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .single()
            .expect("test clock should exist")
    }

    fn enricher<'a>(categories: &'a CategoryMap, teams: &'a TeamRegistry) -> Enricher<'a> {
        Enricher::new(
            categories,
            teams,
            Central,
            Club {
                name: "Austin FC".to_string(),
                abbr: "atx".to_string(),
            },
        )
        .with_now(test_now())
    }

    fn raw_from(json: &str) -> RawEvent {
        serde_json::from_str(json).expect("test event should deserialize")
    }

    #[test]
    fn test_worked_example_home_match() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt1",
                "colorId": "9",
                "summary": "Austin FC vs FC Cincinnati",
                "start": {"date": "2024-03-01"},
                "end": {"date": "2024-03-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(event.category_name, "home-games");
        assert_eq!(event.match_slug.as_deref(), Some("atxvscin"));
        assert_eq!(
            event.start,
            Central.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().unwrap(),
            "all-day events should start at midnight in the display timezone"
        );
        assert_eq!(event.css_classes, vec!["category-9", "event-evt1"]);
        assert!(event.in_past, "March 1 is before the March 15 test clock");
    }

    #[test]
    fn test_unknown_color_falls_back_to_misc() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt2",
                "colorId": "4",
                "summary": "Pub Quiz",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("an unmapped color is not an error");

        assert_eq!(event.category_name, "misc");
        assert_eq!(event.color_id, "4");
    }

    #[test]
    fn test_missing_color_id_uses_unset_sentinel() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt3",
                "summary": "Board Meeting",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(event.color_id, "0");
        assert_eq!(event.category_name, "misc");
        assert_eq!(event.css_classes[0], "category-0");
    }

    #[test]
    fn test_timed_event_is_relabeled_not_converted() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        // Written with an Eastern offset; the page still shows 19:00.
        let raw = raw_from(
            r#"{
                "id": "evt4",
                "summary": "Watch Party",
                "start": {"dateTime": "2024-03-01T19:00:00-04:00"},
                "end": {"dateTime": "2024-03-01T21:00:00-04:00"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(
            event.start,
            Central.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).single().unwrap(),
            "wall clock should be kept and only the timezone label changed"
        );
    }

    #[test]
    fn test_missing_timestamp_is_an_error() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt5",
                "summary": "No Times Here",
                "start": {"date": "2024-04-01"}
            }"#,
        );

        let err = enricher(&categories, &teams)
            .enrich(&raw)
            .expect_err("missing end should fail");
        assert!(
            err.to_string().contains("missing its end timestamp"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_an_error() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt6",
                "summary": "Bad Clock",
                "start": {"dateTime": "not-a-timestamp"},
                "end": {"date": "2024-04-02"}
            }"#,
        );

        let err = enricher(&categories, &teams)
            .enrich(&raw)
            .expect_err("garbage timestamps should fail");
        assert!(
            err.to_string().contains("unparseable start timestamp"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_nonexistent_wall_clock_is_an_error() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        // 2:30 on the spring-forward night does not exist in US/Central.
        let raw = raw_from(
            r#"{
                "id": "evt7",
                "summary": "Gap Event",
                "start": {"dateTime": "2024-03-10T02:30:00"},
                "end": {"dateTime": "2024-03-10T03:30:00"}
            }"#,
        );

        let err = enricher(&categories, &teams)
            .enrich(&raw)
            .expect_err("DST-gap times should fail");
        assert!(
            err.to_string().contains("does not exist"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_offset_less_timestamp_parses() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt8",
                "summary": "Floating Time",
                "start": {"dateTime": "2024-03-01T18:30:00"},
                "end": {"dateTime": "2024-03-01T20:00:00"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(
            event.start,
            Central.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).single().unwrap()
        );
    }

    #[test]
    fn test_datetime_wins_when_both_time_fields_are_set() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt15",
                "summary": "Doubly Timed",
                "start": {"date": "2024-03-05", "dateTime": "2024-03-01T19:00:00-06:00"},
                "end": {"date": "2024-03-05", "dateTime": "2024-03-01T21:00:00-06:00"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(
            event.start,
            Central.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).single().unwrap(),
            "the timed field should win over the all-day date"
        );
    }

    #[test]
    fn test_in_past_is_strict() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt9",
                "summary": "Starts Exactly Now",
                "start": {"dateTime": "2024-03-15T12:00:00"},
                "end": {"dateTime": "2024-03-15T13:00:00"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert!(
            !event.in_past,
            "an event starting exactly at the batch clock is not in the past"
        );
    }

    #[test]
    fn test_zoom_location_detection() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt10",
                "summary": "Remote Meetup",
                "location": "https://us02web.zoom.us/j/123456789",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert!(event.is_over_zoom);
        assert!(event.has_location);
    }

    #[test]
    fn test_plain_address_is_not_zoom() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt11",
                "summary": "In Person",
                "location": "1100 Congress Ave, Austin, TX",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert!(!event.is_over_zoom);
    }

    #[test]
    fn test_match_slug_is_symmetric_across_phrasings() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let enricher = enricher(&categories, &teams);

        let home = raw_from(
            r#"{
                "id": "m1",
                "summary": "Austin FC vs FC Cincinnati",
                "start": {"date": "2024-03-01"},
                "end": {"date": "2024-03-02"}
            }"#,
        );
        let away_phrasing = raw_from(
            r#"{
                "id": "m2",
                "summary": "FC Cincinnati at Austin FC",
                "start": {"date": "2024-03-01"},
                "end": {"date": "2024-03-02"}
            }"#,
        );

        let home = enricher.enrich(&home).expect("should enrich");
        let away_phrasing = enricher.enrich(&away_phrasing).expect("should enrich");

        assert_eq!(home.match_slug.as_deref(), Some("atxvscin"));
        assert_eq!(
            home.match_slug, away_phrasing.match_slug,
            "both phrasings describe the same fixture"
        );
    }

    #[test]
    fn test_match_slug_for_road_games_puts_host_first() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "m3",
                "summary": "Austin FC at FC Dallas",
                "start": {"date": "2024-03-01"},
                "end": {"date": "2024-03-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(event.match_slug.as_deref(), Some("dalvsatx"));
    }

    #[test]
    fn test_match_slug_unknown_opponent_uses_placeholder() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "m4",
                "summary": "Austin FC vs Wrexham AFC",
                "start": {"date": "2024-03-01"},
                "end": {"date": "2024-03-02"}
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(event.match_slug.as_deref(), Some("atxvs-"));
    }

    #[test]
    fn test_titles_without_the_club_are_not_matches() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let enricher = enricher(&categories, &teams);

        for summary in [
            "Night at the Museum Watch Party",
            "FC Dallas vs FC Cincinnati",
            "Monthly Social",
        ] {
            let raw = raw_from(&format!(
                r#"{{
                    "id": "m5",
                    "summary": "{summary}",
                    "start": {{"date": "2024-03-01"}},
                    "end": {{"date": "2024-03-02"}}
                }}"#,
            ));
            let event = enricher.enrich(&raw).expect("should enrich");
            assert_eq!(
                event.match_slug, None,
                "'{summary}' should not produce a slug"
            );
        }
    }

    #[test]
    fn test_unknown_image_mime_is_fatal() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt12",
                "summary": "Weird Attachment",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"},
                "attachments": [{"fileId": "f-9", "mimeType": "image/x-pcx"}]
            }"#,
        );

        let err = enricher(&categories, &teams)
            .enrich(&raw)
            .expect_err("unmappable image mime should fail");
        assert!(matches!(err, CalPageError::UnknownMime(_)), "got: {err}");
    }

    #[test]
    fn test_cover_image_comes_from_first_image_attachment() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt13",
                "summary": "Flyer Night",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"},
                "attachments": [
                    {"fileId": "f-doc", "mimeType": "application/pdf", "title": "agenda"},
                    {"fileId": "f-img", "mimeType": "image/png", "title": "flyer"},
                    {"fileId": "f-img2", "mimeType": "image/jpeg", "title": "photo"}
                ]
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("should enrich");

        assert_eq!(
            event.cover_image_filename.as_deref(),
            Some("f-img.png"),
            "non-image attachments should be skipped"
        );
    }

    #[test]
    fn test_unknown_mime_after_the_cover_is_ignored() {
        let categories = home_game_categories();
        let teams = TeamRegistry::builtin();
        let raw = raw_from(
            r#"{
                "id": "evt14",
                "summary": "Two Flyers",
                "start": {"date": "2024-04-01"},
                "end": {"date": "2024-04-02"},
                "attachments": [
                    {"fileId": "f-cover", "mimeType": "image/png", "title": "flyer"},
                    {"fileId": "f-odd", "mimeType": "image/x-pcx", "title": "scan"}
                ]
            }"#,
        );

        let event = enricher(&categories, &teams)
            .enrich(&raw)
            .expect("only the cover attachment can fail enrichment");

        assert_eq!(event.cover_image_filename.as_deref(), Some("f-cover.png"));
    }
}
