use crate::config::{CliOverrides, Config};
use crate::error::{ExportError, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "docx-image-export")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export images from DOCX to PNG (named by appearance order). Drag-and-drop supported.")]
#[command(
    long_about = "Exports every inline image of a Word document as <n>.png, numbered by first \
                  appearance in the document body, scaled to a target width."
)]
#[command(after_help = "EXAMPLES:\n  \
    docx-image-export report.docx\n  \
    docx-image-export report.docx --out figures --width 800\n  \
    docx-image-export report.docx --width 1200 --upscale --no-pause\n  \
    docx-image-export report.docx --dry-run\n  \
    docx-image-export --interactive")]
pub struct Cli {
    /// Path to .docx (or drag .docx onto the executable)
    pub docx: Option<String>,

    /// Output directory (default: <docx dir>/exported_images)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Target width in pixels (default 500)
    #[arg(short, long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Allow upscaling small images to the target width
    #[arg(long)]
    pub upscale: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// List the images that would be exported without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Fill in the export form interactively
    #[arg(long, conflicts_with = "dry_run")]
    pub interactive: bool,

    /// Generate a sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        self.target_width()?;
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_width(self.target_width().ok().flatten())
            .with_upscale(self.upscale)
            .with_no_pause(self.no_pause)
    }

    /// The `--width` value, which must fit a positive pixel count.
    pub fn target_width(&self) -> Result<Option<u32>> {
        match self.width {
            None => Ok(None),
            Some(width) => u32::try_from(width)
                .ok()
                .filter(|width| *width > 0)
                .map(Some)
                .ok_or(ExportError::InvalidWidth { width }),
        }
    }

    /// The document argument with drag-and-drop quoting removed.
    pub fn docx_path(&self) -> Option<PathBuf> {
        self.docx
            .as_deref()
            .map(clean_path_input)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    pub fn output_directory(&self, docx_path: &Path, config: &Config) -> PathBuf {
        match self.out {
            Some(ref out) => out.clone(),
            None => default_output_dir(docx_path, &config.export.default_dir_name),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Trim whitespace and the double quotes shells add around dropped paths.
pub fn clean_path_input(s: &str) -> &str {
    s.trim().trim_matches('"').trim()
}

/// Accept only existing files with a `.docx` extension (any case).
pub fn validate_docx_path(path: &Path) -> Result<()> {
    let has_docx_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));

    if !path.is_file() || !has_docx_extension {
        return Err(ExportError::InvalidDocument {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

/// `<absolute document dir>/<dir_name>`.
pub fn default_output_dir(docx_path: &Path, dir_name: &str) -> PathBuf {
    let absolute = std::path::absolute(docx_path).unwrap_or_else(|_| docx_path.to_path_buf());
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join(dir_name)
}
