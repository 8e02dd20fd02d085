//! Event categories and their mapping onto calendar colors.
//!
//! Settings declare categories by name ("home-games", "town-events", ...) and
//! tie each one to a palette color. Events only carry a `colorId`, so lookups
//! at enrichment time go through a color-id keyed map built here.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::colors::ColorRegistry;
use crate::error::{CalPageError, CalPageResult};
use crate::images;

/// Category name substituted when an event's color maps to no category.
pub const FALLBACK_CATEGORY: &str = "misc";

/// Category entry as it appears in settings, keyed there by category name.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub gcal_color_name: String,
    #[serde(default)]
    pub always_shown_in_filters: bool,
    /// Drive share link to the cover image used for the whole category.
    #[serde(default)]
    pub default_cover_image: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_fg_color: Option<String>,
    #[serde(default)]
    pub text_bg_color: Option<String>,
}

/// A category with its color resolved against the palette.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub color_id: String,
    /// Background hex of the underlying palette color, when it has one.
    pub background: Option<String>,
    pub always_shown_in_filters: bool,
    pub default_cover_image: Option<String>,
    pub bg_color: Option<String>,
    pub text_fg_color: Option<String>,
    pub text_bg_color: Option<String>,
}

impl CategoryDefinition {
    pub fn css_class(&self) -> String {
        format!("category-{}", self.color_id)
    }

    /// Drive file id of the category's default cover image.
    /// The link shape is validated when the map is built.
    pub fn cover_file_id(&self) -> Option<&str> {
        self.default_cover_image
            .as_deref()
            .and_then(images::drive_file_id)
    }
}

/// Categories keyed by calendar color id. Lookup misses are `None`, never
/// errors; the enricher substitutes [`FALLBACK_CATEGORY`].
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    by_color_id: BTreeMap<String, CategoryDefinition>,
}

impl CategoryMap {
    pub fn from_settings(
        categories: &HashMap<String, CategoryConfig>,
        colors: &ColorRegistry,
    ) -> CalPageResult<Self> {
        let mut names: Vec<&String> = categories.keys().collect();
        names.sort();

        let mut by_color_id = BTreeMap::new();
        for name in names {
            let config = &categories[name];

            let color = colors.by_name(&config.gcal_color_name).ok_or_else(|| {
                CalPageError::Config(format!(
                    "category '{}' uses unknown calendar color '{}'",
                    name, config.gcal_color_name
                ))
            })?;

            if let Some(url) = config.default_cover_image.as_deref() {
                if images::drive_file_id(url).is_none() {
                    return Err(CalPageError::Config(format!(
                        "category '{}' default_cover_image '{}' is not a drive file link",
                        name, url
                    )));
                }
            }

            let definition = CategoryDefinition {
                name: name.clone(),
                color_id: color.id.to_string(),
                background: color.background.map(str::to_string),
                always_shown_in_filters: config.always_shown_in_filters,
                default_cover_image: config.default_cover_image.clone(),
                bg_color: config.bg_color.clone(),
                text_fg_color: config.text_fg_color.clone(),
                text_bg_color: config.text_bg_color.clone(),
            };

            if let Some(existing) = by_color_id.insert(color.id.to_string(), definition) {
                return Err(CalPageError::Config(format!(
                    "categories '{}' and '{}' both claim calendar color '{}'",
                    existing.name, name, config.gcal_color_name
                )));
            }
        }

        Ok(CategoryMap { by_color_id })
    }

    pub fn by_color_id(&self, color_id: &str) -> Option<&CategoryDefinition> {
        self.by_color_id.get(color_id)
    }

    /// Color id configured for a category name (case-insensitive).
    pub fn color_id_for(&self, category_name: &str) -> Option<&str> {
        self.by_color_id
            .values()
            .find(|definition| definition.name.eq_ignore_ascii_case(category_name))
            .map(|definition| definition.color_id.as_str())
    }

    /// Names of the categories always shown as filters, even with no events.
    pub fn default_names(&self) -> HashSet<String> {
        self.by_color_id
            .values()
            .filter(|definition| definition.always_shown_in_filters)
            .map(|definition| definition.name.clone())
            .collect()
    }

    /// All definitions, in stable color-id order.
    pub fn definitions(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.by_color_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_color_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_color_id.is_empty()
    }
}
