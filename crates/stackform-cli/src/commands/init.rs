use std::path::Path;

use anyhow::{Result, bail};

use stackform_manifest::DeployConfig;

pub fn init(path: &str, app: &str, env: &str, region: &str) -> Result<()> {
    let output = Path::new(path).join("stackform.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    let config = DeployConfig::scaffold(app, env, region);
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_scaffold_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        init(path, "shop", "test", "eu-west-1").unwrap();

        let config = DeployConfig::from_file(&dir.path().join("stackform.toml")).unwrap();
        assert_eq!(config.app.name, "shop");
        assert_eq!(config.env.region, "eu-west-1");

        assert!(init(path, "shop", "test", "eu-west-1").is_err());
    }
}
