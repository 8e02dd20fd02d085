use anyhow::Result;
use calpage_core::calendar::Calendar;
use calpage_core::source::EventSource;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(
    calendar: &mut Calendar,
    source: &dyn EventSource,
    category: Option<&str>,
) -> Result<()> {
    let events = calendar.load_events(source)?;

    let events: Vec<_> = events
        .iter()
        .filter(|e| category.is_none_or(|c| e.category_name.eq_ignore_ascii_case(c)))
        .collect();

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day and print
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = event.start.format("%a %b %-d %Y").to_string();

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        println!("  {}", event.render());
    }

    Ok(())
}
