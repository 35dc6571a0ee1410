use crate::error::{ExportError, UserFriendlyError};
use crate::extractor::{ExportPlan, ExportReport};
use crate::ui::progress::format_duration;
use console::{style, Emoji};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PICTURE: Emoji = Emoji("🖼️  ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => console::colors_enabled() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("{}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("{}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", PICTURE, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Plain lines that must reach the user regardless of mode or verbosity.
    pub fn notice(&self, message: &str) {
        match self.mode {
            OutputMode::Json => self.print_json_message("notice", message),
            _ => println!("{}", message),
        }
    }

    // User-friendly error handling
    pub fn print_failure(&self, error: &ExportError) {
        self.error(&format!("Failed: {}", error.user_message()));

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_export_report(&self, report: &ExportReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_plan(&self, plan: &ExportPlan<'_>, output_dir: &Path) {
        match self.mode {
            OutputMode::Json => {
                let images: Vec<_> = plan
                    .images
                    .iter()
                    .map(|planned| {
                        serde_json::json!({
                            "file": planned.file_name(),
                            "r_id": planned.r_id,
                            "source_part": planned.part.partname,
                            "content_type": planned.part.content_type,
                            "bytes": planned.part.blob.len(),
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "plan",
                    "output_dir": output_dir.display().to_string(),
                    "images": images,
                    "shapes_total": plan.shapes_total,
                    "shapes_without_image": plan.shapes_without_image,
                    "unresolved": plan.unresolved,
                }));
            }
            _ => {
                println!("Output directory: {}", output_dir.display());
                for planned in &plan.images {
                    println!(
                        "  {:>8}  <- {} ({}, {}, {} bytes)",
                        planned.file_name(),
                        planned.part.partname,
                        planned.r_id,
                        planned.part.content_type,
                        planned.part.blob.len()
                    );
                }
                if !plan.unresolved.is_empty() {
                    println!("  Unresolved relationships: {}", plan.unresolved.join(", "));
                }
                println!(
                    "{} image(s) would be exported from {} inline shape(s)",
                    plan.len(),
                    plan.shapes_total
                );
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{}", style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            match msg_type {
                MessageType::Error => eprintln!("{}", message),
                _ => println!("{}", message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &ExportReport) {
        self.success(&completion_message(report.count()));
        println!("Output: {}", report.output_dir.display());

        if !self.should_show_message(1) {
            return;
        }

        self.print_separator();
        for image in &report.images {
            let size = if image.size.was_resized() {
                format!(
                    "{}x{} -> {}x{}",
                    image.size.original_width,
                    image.size.original_height,
                    image.size.width,
                    image.size.height
                )
            } else {
                format!("{}x{}", image.size.width, image.size.height)
            };
            println!(
                "  {:>8}  <- {} ({}) {}",
                format!("{}.png", image.ordinal),
                image.source_part,
                image.r_id,
                if self.use_colors {
                    style(size).cyan().to_string()
                } else {
                    size
                }
            );
        }

        if !report.unresolved.is_empty() {
            println!("  Skipped unresolved relationships: {}", report.unresolved.join(", "));
        }
        println!(
            "  Resized: {} of {}, time taken: {}",
            report.resized_count(),
            report.count(),
            format_duration(report.duration)
        );
        self.print_separator();
    }

    fn print_plain_report(&self, report: &ExportReport) {
        println!("{}", completion_message(report.count()));
        println!("Output: {}", report.output_dir.display());
        if self.should_show_message(1) {
            for image in &report.images {
                println!(
                    "{}.png {} {} {}x{}",
                    image.ordinal, image.r_id, image.source_part, image.size.width, image.size.height
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub fn completion_message(count: usize) -> String {
    format!("Done. Exported {} image(s).", count)
}
