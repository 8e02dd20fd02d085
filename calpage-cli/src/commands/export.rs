use std::path::Path;

use anyhow::{Context, Result};
use calpage_core::calendar::Calendar;
use calpage_core::context::RenderContext;
use calpage_core::images::ImageStore;
use calpage_core::settings::Settings;
use calpage_core::source::EventSource;

pub fn run(
    calendar: &mut Calendar,
    source: &dyn EventSource,
    settings: &Settings,
    images_dir: &Path,
    out: Option<&Path>,
) -> Result<()> {
    calendar.load_events(source)?;

    let store = ImageStore::new(images_dir);
    let context = RenderContext::build(calendar, settings, &store);
    let json = context.to_json()?;

    match out {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write render context to {}", path.display()))?;
            println!("Wrote render context to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
