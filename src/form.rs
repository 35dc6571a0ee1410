//! The export form: the state a graphical or interactive front end edits,
//! and the rules it applies before handing a request to the exporter.

use crate::cli::{clean_path_input, default_output_dir, validate_docx_path};
use crate::config::{ExportConfig, DEFAULT_DIR_NAME, DEFAULT_TARGET_WIDTH};
use crate::error::UserFriendlyError;
use crate::extractor::{ExportRequest, ImageExporter, ResizePolicy};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please choose a valid .docx file")]
    InvalidDocument,

    #[error("Width must be a positive integer (e.g. 500)")]
    InvalidWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

/// What a modal dialog would show after the export button is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    fn info(title: &str, message: String) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.to_string(),
            message,
        }
    }

    fn error(title: &str, message: String) -> Self {
        Self {
            kind: DialogKind::Error,
            title: title.to_string(),
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == DialogKind::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub document_path: String,
    pub output_dir: String,
    pub width_text: String,
    pub upscale: bool,
    default_dir_name: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            document_path: String::new(),
            output_dir: String::new(),
            width_text: DEFAULT_TARGET_WIDTH.to_string(),
            upscale: false,
            default_dir_name: DEFAULT_DIR_NAME.to_string(),
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            width_text: config.width.to_string(),
            upscale: config.upscale,
            default_dir_name: config.default_dir_name.clone(),
            ..Self::default()
        }
    }

    /// Picking a document also proposes `<document dir>/exported_images` as output.
    ///
    /// An empty selection (a cancelled picker) leaves the form untouched.
    pub fn choose_document(&mut self, path: &str) {
        let path = clean_path_input(path);
        if path.is_empty() {
            return;
        }
        self.document_path = path.to_string();
        self.output_dir = self.default_output_dir(Path::new(path)).display().to_string();
    }

    pub fn choose_output_dir(&mut self, path: &str) {
        let path = clean_path_input(path);
        if !path.is_empty() {
            self.output_dir = path.to_string();
        }
    }

    /// Check the fields and build the request; an empty output directory is
    /// replaced by the default and written back into the form.
    pub fn validate(&mut self) -> Result<ExportRequest, FormError> {
        let document = PathBuf::from(clean_path_input(&self.document_path));
        if document.as_os_str().is_empty() || validate_docx_path(&document).is_err() {
            return Err(FormError::InvalidDocument);
        }

        let width = match self.width_text.trim().parse::<u32>() {
            Ok(width) if width > 0 => width,
            _ => return Err(FormError::InvalidWidth),
        };

        let output_dir = clean_path_input(&self.output_dir).to_string();
        let output_dir = if output_dir.is_empty() {
            let default = self.default_output_dir(&document);
            self.output_dir = default.display().to_string();
            default
        } else {
            PathBuf::from(output_dir)
        };

        Ok(ExportRequest::new(
            document,
            output_dir,
            ResizePolicy::new(width, self.upscale),
        ))
    }

    /// Validate, export, and describe the outcome as a dialog.
    pub fn submit(&mut self, exporter: &ImageExporter) -> Dialog {
        let request = match self.validate() {
            Ok(request) => request,
            Err(e) => return Dialog::error("Error", e.to_string()),
        };

        match exporter.export(&request, None) {
            Ok(report) => Dialog::info(
                "Done",
                format!(
                    "Export finished: {} image(s) exported\nOutput: {}",
                    report.count(),
                    request.output_dir.display()
                ),
            ),
            Err(e) => Dialog::error("Failed", format!("Export failed: {}", e.user_message())),
        }
    }

    fn default_output_dir(&self, document: &Path) -> PathBuf {
        default_output_dir(document, &self.default_dir_name)
    }
}
