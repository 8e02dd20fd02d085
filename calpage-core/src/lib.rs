//! Core pipeline for the calpage events site.
//!
//! This crate turns raw calendar events into the enriched, categorized data
//! the static page is rendered from:
//! - `settings` loads configuration from defaults, remote config, and env
//! - `source` fetches raw events, `enrich` categorizes and timestamps them
//! - `calendar` aggregates a batch and derives the page's filter sets
//! - `images` plans cover downloads, `context` packages the render data

pub mod calendar;
pub mod category;
pub mod colors;
pub mod context;
pub mod enrich;
pub mod error;
pub mod event;
pub mod images;
pub mod settings;
pub mod source;
pub mod teams;

pub use error::{CalPageError, CalPageResult};
