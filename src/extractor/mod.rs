pub mod exporter;
pub mod render;
pub mod report;

pub use exporter::{export_images, plan_exports, ExportPlan, ExportProgress, ExportRequest, ImageExporter, PlannedImage};
pub use render::{render_rgba, save_blob_as_png, RenderedImage, ResizePolicy};
pub use report::{ExportReport, ExportedImage};
