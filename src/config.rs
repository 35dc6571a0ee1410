use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TARGET_WIDTH: u32 = 500;
pub const DEFAULT_DIR_NAME: &str = "exported_images";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub export: ExportConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Target output width in pixels
    pub width: u32,
    /// Enlarge images narrower than `width`
    pub upscale: bool,
    /// Folder created next to the document when no output directory is given
    pub default_dir_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Wait for Enter before the process exits
    pub pause_on_exit: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            upscale: false,
            default_dir_name: DEFAULT_DIR_NAME.to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            // Drag-and-drop launches have no surrounding terminal to read the result in
            pause_on_exit: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExportError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExportError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ExportError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["docx-image-export.toml", ".docx-image-export.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(width) = cli_args.width {
            self.export.width = width;
        }

        // A flag can only switch upscaling on
        if cli_args.upscale {
            self.export.upscale = true;
        }

        if cli_args.no_pause {
            self.ui.pause_on_exit = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ExportError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ExportError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.width == 0 {
            return Err(ExportError::Config {
                message: "Target width must be greater than 0".to_string(),
            });
        }

        let name = self.export.default_dir_name.trim();
        if name.is_empty() {
            return Err(ExportError::Config {
                message: "Default output folder name cannot be empty".to_string(),
            });
        }

        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(ExportError::Config {
                message: format!(
                    "Default output folder name must be a plain folder name: {}",
                    name
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<u32>,
    pub upscale: bool,
    pub no_pause: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: Option<u32>) -> Self {
        self.width = width;
        self
    }

    pub fn with_upscale(mut self, upscale: bool) -> Self {
        self.upscale = upscale;
        self
    }

    pub fn with_no_pause(mut self, no_pause: bool) -> Self {
        self.no_pause = no_pause;
        self
    }
}
