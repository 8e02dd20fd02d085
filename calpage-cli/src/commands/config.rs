use anyhow::Result;
use calpage_core::settings::Settings;
use owo_colors::OwoColorize;

pub fn run(settings: &Settings) -> Result<()> {
    println!("{}", "Calendar".bold());
    println!("  Id:        {}", settings.calendar_id);
    println!("  Timezone:  {}", settings.display_timezone);
    println!(
        "  Club:      {} ({})",
        settings.club_name, settings.club_abbr
    );

    println!();
    println!("{}", "Site".bold());
    println!("  Base URL:  {}", settings.base_url());

    println!();
    println!("{}", "Categories".bold());
    if settings.event_categories.is_empty() {
        println!("  {}", "(none configured)".dimmed());
    } else {
        let mut names: Vec<&String> = settings.event_categories.keys().collect();
        names.sort();

        for name in names {
            let category = &settings.event_categories[name];
            let marker = if category.always_shown_in_filters {
                " (always shown)"
            } else {
                ""
            };
            println!("  {}: {}{}", name, category.gcal_color_name, marker);
        }
    }

    println!();
    println!("{}", "Teams".bold());
    match &settings.teams {
        Some(teams) => println!("  {} configured", teams.len()),
        None => println!("  {}", "builtin league table".dimmed()),
    }

    Ok(())
}
