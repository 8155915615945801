use std::path::Path;

use papyri_core::config::{user_config_path, PapyriConfig};

/// Write the default configuration to `~/papyri/papyri.yml`.
///
/// Safe to run multiple times; an existing file is kept unless `force` is true.
pub fn cmd_init(force: bool) -> Result<(), String> {
    let path = user_config_path().ok_or("Could not determine home directory")?;

    if init_config_at(&path, force)? {
        println!("Wrote default configuration to {}", path.display());
    } else {
        println!(
            "Skipped: {} (already exists, use --force to overwrite)",
            path.display()
        );
    }
    Ok(())
}

/// Write the default configuration to `path`. Returns whether the file was written.
pub fn init_config_at(path: &Path, force: bool) -> Result<bool, String> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
    }
    let yaml = PapyriConfig::default().to_yaml()?;
    std::fs::write(path, yaml).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(true)
}
