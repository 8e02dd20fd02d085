use std::collections::HashSet;

use anyhow::Result;
use calpage_core::calendar::Calendar;
use calpage_core::source::EventSource;
use owo_colors::OwoColorize;

pub fn run(calendar: &mut Calendar, source: &dyn EventSource) -> Result<()> {
    calendar.load_events(source)?;

    print_set("Default (always shown)", calendar.default_category_names());
    print_set("Current (have events)", calendar.current_category_names());
    print_set("Additional (shown only while events exist)", calendar.additional_category_names());
    print_set("Empty (hidden until events appear)", calendar.empty_category_names());

    Ok(())
}

fn print_set(label: &str, names: HashSet<String>) {
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();

    let rendered = if names.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        names.join(", ")
    };

    println!("{} {}", format!("{label}:").bold(), rendered);
}
