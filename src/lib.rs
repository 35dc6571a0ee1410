pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod form;
pub mod package;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExportConfig, UiConfig};
pub use error::{ExportError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    export_images, plan_exports, ExportPlan, ExportProgress, ExportReport, ExportRequest,
    ExportedImage, ImageExporter, RenderedImage, ResizePolicy,
};
pub use form::{Dialog, DialogKind, FormError, FormState};
pub use package::{DocxPackage, Part};
pub use ui::{InteractiveSession, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface: configuration plus the terminal front end around
/// an [`ImageExporter`].
pub struct DocxImageExport {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    exporter: ImageExporter,
}

impl DocxImageExport {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        // Progress bars would interleave with machine-readable output
        let show_progress = !quiet && output_mode == OutputMode::Human;

        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(show_progress),
            exporter: ImageExporter::new(),
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// The configured resize policy.
    pub fn policy(&self) -> ResizePolicy {
        ResizePolicy::new(self.config.export.width, self.config.export.upscale)
    }

    /// Export the images of `docx_path` into `output_dir` with a progress bar.
    pub fn export(&self, docx_path: &Path, output_dir: &Path) -> Result<ExportReport> {
        self.output_formatter
            .start_operation(&format!("Exporting images from {}", docx_path.display()));

        let request = ExportRequest::new(docx_path, output_dir, self.policy());
        let image_progress = self.progress_manager.create_image_progress(0);
        let progress_callback = {
            let pb = image_progress.clone();
            move |progress: &ExportProgress| {
                ui::progress::update_image_progress(&pb, progress);
            }
        };

        let result = self.exporter.export(&request, Some(&progress_callback));

        match result {
            Ok(ref report) => ui::progress::finish_progress_with_summary(
                &image_progress,
                &format!("Exported {} image(s)", report.count()),
                report.duration,
            ),
            Err(_) => image_progress.abandon(),
        }
        self.progress_manager.clear();

        if let Ok(ref report) = result {
            if !report.unresolved.is_empty() {
                self.output_formatter.warning(&format!(
                    "Skipped {} unresolved image reference(s): {}",
                    report.unresolved.len(),
                    report.unresolved.join(", ")
                ));
            }
        }

        result
    }

    /// Open the document and list what an export would write, touching nothing on disk.
    pub fn dry_run(&self, docx_path: &Path, output_dir: &Path) -> Result<usize> {
        let formatter = &self.output_formatter;
        formatter.info("DRY RUN MODE - No files will be written");

        let spinner = self.progress_manager.create_spinner("Reading document");
        let package = DocxPackage::open(docx_path);
        spinner.finish_and_clear();
        let package = package?;

        formatter.debug(&format!(
            "{} parts, main document {}",
            package.part_count(),
            package.main_partname()
        ));

        let plan = plan_exports(&package)?;
        formatter.print_header("Export plan");
        formatter.print_plan(&plan, output_dir);

        let policy = self.policy();
        formatter.info(&format!(
            "Target width: {}px, upscale: {}",
            policy.target_width,
            if policy.allow_upscale { "yes" } else { "no" }
        ));

        Ok(plan.len())
    }

    /// Fill in the export form on the terminal, starting from the configured
    /// settings and whatever document and output folder were already given.
    pub fn run_interactive(&self, docx_path: Option<&Path>, output_dir: Option<&Path>) -> Result<Dialog> {
        let mut form = self.initial_form(docx_path, output_dir);
        InteractiveSession::new().run(&mut form, &self.exporter)
    }

    fn initial_form(&self, docx_path: Option<&Path>, output_dir: Option<&Path>) -> FormState {
        let mut form = FormState::from_config(&self.config.export);
        if let Some(path) = docx_path {
            form.choose_document(&path.display().to_string());
        }
        // Chosen after the document so it is not replaced by the default
        if let Some(dir) = output_dir {
            form.choose_output_dir(&dir.display().to_string());
        }
        form
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Whether the console should wait for Enter before the process exits.
    pub fn should_pause(&self) -> bool {
        self.config.ui.pause_on_exit
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ExportError) {
        self.output_formatter.print_failure(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
