//! Configuration loading.
//!
//! A `papyri.yml` file provides the default enhancement request plus the
//! locations of external helpers. Unreadable or unparsable files are skipped
//! with a warning; when nothing usable is found the built-in defaults apply.


use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::EnhancementRequest;

/// Canonical list of candidate config file names we search for on disk.
const CONFIG_FILENAMES: &[&str] = &["papyri.yml", "papyri.yaml"];

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PAPYRI_CONFIG";

/// Public handle that stores the loaded configuration, its source path, and warnings.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    pub config: PapyriConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ConfigHandle {
    fn with_config(config: PapyriConfig, source: Option<PathBuf>, warnings: Vec<String>) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }
}

/// Color management settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Expand color images from sRGB to Adobe RGB (1998) before enhancement
    pub gamut_expansion: bool,
    /// Directory holding `sRGB.icc` and `AdobeRGB1998.icc`; built-in profiles when unset
    pub profile_dir: Option<PathBuf>,
    /// Embed the sRGB profile in written files
    pub embed_icc: bool,
    /// exiftool program used to embed profiles in JPEG files
    pub exiftool: PathBuf,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            gamut_expansion: true,
            profile_dir: None,
            embed_icc: true,
            exiftool: PathBuf::from("exiftool"),
        }
    }
}

/// External retinex program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetinexConfig {
    /// Invoked as `<command> <method> <in.png> <out.png> [--negative] [--hue-complement]`
    pub command: Option<PathBuf>,
}

/// Complete configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PapyriConfig {
    pub defaults: EnhancementRequest,
    pub color: ColorConfig,
    pub retinex: RetinexConfig,
}

impl PapyriConfig {
    /// Force out-of-range values into range, returning a message per change.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut adjustments = self.defaults.sanitize();
        if let Some(dir) = &self.color.profile_dir {
            if dir.as_os_str().is_empty() {
                self.color.profile_dir = None;
                adjustments.push("color.profile_dir empty, using built-in profiles".to_string());
            }
        }
        if self.color.exiftool.as_os_str().is_empty() {
            self.color.exiftool = PathBuf::from("exiftool");
            adjustments.push("color.exiftool empty, using \"exiftool\"".to_string());
        }
        adjustments
    }

    /// The request new runs start from.
    pub fn to_request(&self) -> EnhancementRequest {
        self.defaults.clone()
    }

    /// The configuration serialized as YAML.
    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize config: {}", e))
    }
}

/// Load configuration from disk, optionally forcing a specific path.
pub fn load_config(custom_path: Option<&Path>) -> ConfigHandle {
    let mut warnings = Vec::new();
    let candidates = get_config_candidates(custom_path);

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match serde_yaml::from_str::<PapyriConfig>(&contents) {
                Ok(mut config) => {
                    warnings.extend(config.sanitize());
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    debug!(source = %source.display(), "loaded config");
                    return ConfigHandle::with_config(config, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    debug!("no config found, using built-in defaults");
    ConfigHandle::with_config(PapyriConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if !env_path.is_empty() {
            candidates.push(PathBuf::from(env_path));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
        }
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home) = user_config_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home.join(name));
        }
    }

    candidates
}

/// `~/papyri`, where `papyri init` writes its config.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("papyri"))
}

/// Path `papyri init` writes to.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILENAMES[0]))
}
