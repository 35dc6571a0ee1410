use clap::Parser;
use docx_image_export::{
    ui::pause_for_keypress, Cli, DocxImageExport, ExportError, OutputFormatter, OutputMode,
    UserFriendlyError,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity_level());

    let pause = run(&cli);
    if pause {
        pause_for_keypress();
    }
}

/// Runs the requested command; returns whether to wait for Enter before exiting.
fn run(cli: &Cli) -> bool {
    if cli.generate_config {
        handle_generate_config(cli);
        return false;
    }

    let app = match DocxImageExport::from_cli(cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return !cli.no_pause;
        }
    };
    let pause = app.should_pause();

    if cli.interactive {
        if let Err(e) = app.run_interactive(cli.docx_path().as_deref(), cli.out.as_deref()) {
            app.handle_error(&e);
        }
        return pause;
    }

    let Some(docx_path) = cli.docx_path() else {
        print_usage(app.output_formatter());
        return pause;
    };

    if let Err(e) = docx_image_export::cli::validate_docx_path(&docx_path) {
        app.output_formatter().error(&e.user_message());
        return pause;
    }

    let output_dir = cli.output_directory(&docx_path, app.config());

    if cli.dry_run {
        handle_dry_run(&app, &docx_path, &output_dir);
        return pause;
    }

    match app.export(&docx_path, &output_dir) {
        Ok(report) => app.output_formatter().print_export_report(&report),
        Err(e) => app.handle_error(&e),
    }

    pause
}

fn handle_generate_config(cli: &Cli) {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "docx-image-export.toml".to_string());

    match DocxImageExport::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  docx-image-export <file.docx> --config {}", config_path);
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
        }
    }
}

fn handle_dry_run(app: &DocxImageExport, docx_path: &Path, output_dir: &Path) {
    match app.dry_run(docx_path, output_dir) {
        Ok(_) => app
            .output_formatter()
            .info("Run without --dry-run to perform the export"),
        Err(e) => app.handle_error(&e),
    }
}

fn print_usage(formatter: &OutputFormatter) {
    formatter.notice("Usage: docx-image-export <file.docx>");
    formatter.notice("Tip: drag a .docx file onto the executable, or run with --interactive.");
}

fn print_startup_error(error: &ExportError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_failure(error);
}

fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "docx_image_export=warn",
        1 => "docx_image_export=info",
        _ => "docx_image_export=debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
