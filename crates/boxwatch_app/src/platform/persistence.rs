use std::path::Path;

use boxwatch_core::DEFAULT_SERVER_ADDRESS;
use boxwatch_engine::{ensure_state_dir, AtomicFileWriter};
use serde::{Deserialize, Serialize};
use sync_logging::{sync_error, sync_info, sync_warn};

const SETTINGS_FILENAME: &str = ".boxwatch_settings.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub server_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }
}

pub(crate) fn load_settings(state_dir: &Path) -> Settings {
    let writer = AtomicFileWriter::new(state_dir);
    let content = match writer.read(SETTINGS_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return Settings::default(),
        Err(err) => {
            sync_warn!("Failed to read settings from {:?}: {}", state_dir, err);
            return Settings::default();
        }
    };

    match ron::from_str::<Settings>(&content) {
        Ok(settings) if !settings.server_address.trim().is_empty() => {
            sync_info!("Loaded settings from {:?}", state_dir);
            settings
        }
        Ok(_) => Settings::default(),
        Err(err) => {
            sync_warn!("Failed to parse settings in {:?}: {}", state_dir, err);
            Settings::default()
        }
    }
}

pub(crate) fn save_settings(state_dir: &Path, settings: &Settings) {
    if let Err(err) = ensure_state_dir(state_dir) {
        sync_error!("Failed to ensure state dir {:?}: {}", state_dir, err);
        return;
    }

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(settings, pretty) {
        Ok(text) => text,
        Err(err) => {
            sync_error!("Failed to serialize settings: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(state_dir);
    if let Err(err) = writer.write(SETTINGS_FILENAME, &content) {
        sync_error!("Failed to write settings to {:?}: {}", state_dir, err);
    }
}
