//! Terminal rendering for calpage types.
//!
//! Extension trait adding colored one-line rendering to calpage-core types
//! using owo_colors.

use calpage_core::event::Event;
use calpage_core::images::ImageFetch;
use owo_colors::OwoColorize;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let time = format!("{:>5}", self.start.format("%H:%M"));
        let category = format!("[{}]", self.category_name);

        let mut line = format!("{} {} {}", time, self.summary, category.dimmed());
        if let Some(slug) = &self.match_slug {
            line.push_str(&format!(" {}", slug.cyan()));
        }
        if self.is_over_zoom {
            line.push_str(&format!(" {}", "(zoom)".blue()));
        }

        if self.in_past {
            line.dimmed().to_string()
        } else {
            line
        }
    }
}

impl Render for ImageFetch {
    fn render(&self) -> String {
        match &self.filename {
            Some(filename) => {
                format!("{} {}", self.file_id, format!("-> {}", filename).dimmed())
            }
            // Category covers come from drive links without a mime type, so
            // the extension is only known once the file is downloaded.
            None => format!(
                "{} {}",
                self.file_id,
                "(extension known after download)".dimmed()
            ),
        }
    }
}
