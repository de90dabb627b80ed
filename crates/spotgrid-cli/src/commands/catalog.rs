use spotgrid_catalog::{CatalogSource, JsonFileSource, build_catalog, summarize};

pub fn summary(path: &str, format: &str) -> anyhow::Result<()> {
    let instances = JsonFileSource::new(path).fetch()?;
    let catalog = build_catalog(instances)?;
    let summaries = summarize(&catalog);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        _ => {
            println!("{}", crate::report::format_summary(&summaries));
        }
    }

    Ok(())
}
