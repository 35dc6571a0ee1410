use crate::extractor::exporter::{ExportPlan, ExportRequest, PlannedImage};
use crate::extractor::render::{RenderedImage, ResizePolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedImage {
    pub ordinal: usize,
    pub r_id: String,
    pub source_part: String,
    pub content_type: String,
    pub shape_name: Option<String>,
    pub path: PathBuf,
    #[serde(flatten)]
    pub size: RenderedImage,
}

impl ExportedImage {
    pub fn new(planned: &PlannedImage<'_>, path: PathBuf, size: RenderedImage) -> Self {
        Self {
            ordinal: planned.ordinal,
            r_id: planned.r_id.clone(),
            source_part: planned.part.partname.to_string(),
            content_type: planned.part.content_type.to_string(),
            shape_name: planned.shape_name.clone(),
            path,
            size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// Tool name and version that wrote the images
    pub generator: String,
    pub document: PathBuf,
    pub output_dir: PathBuf,
    pub settings: ResizePolicy,
    pub images: Vec<ExportedImage>,
    pub shapes_total: usize,
    pub shapes_without_image: usize,
    pub unresolved: Vec<String>,
    pub duration: Duration,
    pub exported_at: DateTime<Utc>,
}

impl ExportReport {
    pub fn new(
        request: &ExportRequest,
        images: Vec<ExportedImage>,
        plan: &ExportPlan<'_>,
        duration: Duration,
    ) -> Self {
        Self {
            generator: format!("docx-image-export {}", crate::version_info()),
            document: request.document_path.clone(),
            output_dir: request.output_dir.clone(),
            settings: request.policy,
            images,
            shapes_total: plan.shapes_total,
            shapes_without_image: plan.shapes_without_image,
            unresolved: plan.unresolved.clone(),
            duration,
            exported_at: Utc::now(),
        }
    }

    /// Number of PNG files written.
    pub fn count(&self) -> usize {
        self.images.len()
    }

    pub fn resized_count(&self) -> usize {
        self.images.iter().filter(|image| image.size.was_resized()).count()
    }
}
