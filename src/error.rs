use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document package: {message}")]
    Package { message: String },

    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Image processing failed: {message}")]
    Image { message: String },

    #[error("Invalid image size: {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Invalid target width: {width}")]
    InvalidWidth { width: i64 },

    #[error("Not a valid .docx file: {path}")]
    InvalidDocument { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ExportError {
    pub(crate) fn xml<S: Into<String>, M: std::fmt::Display>(part: S, message: M) -> Self {
        ExportError::Xml {
            part: part.into(),
            message: message.to_string(),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExportError {
    fn user_message(&self) -> String {
        match self {
            ExportError::Package { message } => {
                format!("Could not read the document: {}", message)
            }
            ExportError::Xml { part, message } => {
                format!("The document part {} is malformed: {}", part, message)
            }
            ExportError::Image { message } => {
                format!("Could not convert an embedded image: {}", message)
            }
            ExportError::InvalidImageSize { width, height } => {
                format!("Invalid image size ({}x{})", width, height)
            }
            ExportError::InvalidWidth { width } => {
                format!("Target width must be a positive integer, got {}", width)
            }
            ExportError::InvalidDocument { path } => {
                format!("Not a valid .docx file: {}", path)
            }
            ExportError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExportError::Package { .. } => Some(
                "Make sure the file is a Word document saved in .docx format (not .doc or a renamed file).".to_string()
            ),
            ExportError::Image { .. } => Some(
                "The embedded image may be corrupt or stored in an unsupported format such as EMF/WMF.".to_string()
            ),
            ExportError::InvalidWidth { .. } => Some(
                "Pass a width greater than zero with --width (e.g. --width 500).".to_string()
            ),
            ExportError::InvalidDocument { .. } => Some(
                "Drag a .docx file onto the program or pass its path as the first argument.".to_string()
            ),
            ExportError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config.".to_string()
            ),
            ExportError::Io(_) => Some(
                "Ensure the output directory is writable and the disk is not full.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(error: toml::de::Error) -> Self {
        ExportError::Config {
            message: error.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(e) => ExportError::Io(e),
            other => ExportError::Package {
                message: other.to_string(),
            },
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => ExportError::Io(e),
            other => ExportError::Image {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
