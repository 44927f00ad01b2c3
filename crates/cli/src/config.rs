//! Provider configuration file loading
//!
//! The provider config is an INI file (default `~/.oci/config`) with one
//! section per profile. Named profiles inherit any key they do not set from
//! the `[DEFAULT]` section.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Profile used when none is given
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Settings the report needs from the selected profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub profile: String,
    pub tenancy: String,
    pub region: String,
}

impl ProviderConfig {
    /// Load the given profile from `path`, or from the default location
    pub fn load(path: Option<&str>, profile: &str) -> Result<Self> {
        let path = match path {
            Some(p) => expand_home(p)?,
            None => default_config_path()?,
        };
        Self::load_from(&path, profile)
    }

    /// Load a profile from an explicit file path
    pub fn load_from(path: &Path, profile: &str) -> Result<Self> {
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Ini))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let raw: HashMap<String, HashMap<String, String>> = settings
            .try_deserialize()
            .context("Failed to parse config file")?;
        let sections = lowercase_sections(raw);

        let default_section = sections.get(&DEFAULT_PROFILE.to_lowercase());
        let selected = sections.get(&profile.to_lowercase());
        if selected.is_none() && !profile.eq_ignore_ascii_case(DEFAULT_PROFILE) {
            bail!("Profile '{}' not found in {}", profile, path.display());
        }

        let lookup = |key: &str| -> Option<String> {
            selected
                .and_then(|s| s.get(key))
                .or_else(|| default_section.and_then(|s| s.get(key)))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tenancy = lookup("tenancy")
            .with_context(|| format!("Profile '{}' does not set 'tenancy'", profile))?;
        let region = lookup("region")
            .with_context(|| format!("Profile '{}' does not set 'region'", profile))?;

        Ok(Self {
            profile: profile.to_string(),
            tenancy,
            region,
        })
    }
}

fn lowercase_sections(
    raw: HashMap<String, HashMap<String, String>>,
) -> HashMap<String, HashMap<String, String>> {
    raw.into_iter()
        .map(|(section, keys)| {
            let keys = keys
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect();
            (section.to_lowercase(), keys)
        })
        .collect()
}

/// Get the default provider config path
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs_next::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".oci").join("config"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs_next::home_dir().context("Could not determine home directory")?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
