use std::path::Path;

use anyhow::bail;
use spotgrid_core::SpotgridConfig;

pub fn init(path: &str, catalog: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("spotgrid.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let config = SpotgridConfig::scaffold(catalog);
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_loadable_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        init(&path, "prices/aws.json").unwrap();

        let config = SpotgridConfig::from_file(&dir.path().join("spotgrid.toml")).unwrap();
        assert_eq!(config.services.len(), 1);
        assert_eq!(
            config.catalog.and_then(|c| c.path).as_deref(),
            Some("prices/aws.json")
        );
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("spotgrid.toml"), "# mine\n").unwrap();

        let path = dir.path().to_string_lossy().into_owned();
        assert!(init(&path, "catalog.json").is_err());
        let kept = std::fs::read_to_string(dir.path().join("spotgrid.toml")).unwrap();
        assert_eq!(kept, "# mine\n");
    }
}
