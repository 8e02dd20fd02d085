use std::path::Path;

use anyhow::Result;
use calpage_core::calendar::Calendar;
use calpage_core::images::ImageStore;
use calpage_core::source::EventSource;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(calendar: &mut Calendar, source: &dyn EventSource, dir: &Path) -> Result<()> {
    calendar.load_events(source)?;

    let store = ImageStore::new(dir);
    let fetches = store.plan(calendar.events(), calendar.categories())?;

    if fetches.is_empty() {
        println!("{}", "All cover images are already on disk".dimmed());
        return Ok(());
    }

    let heading = format!(
        "{} cover image(s) to download into {}",
        fetches.len(),
        dir.display()
    );
    println!("{}", heading.bold());

    for fetch in &fetches {
        println!("  {}", fetch.render());
    }

    Ok(())
}
