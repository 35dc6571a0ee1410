use crate::error::{ExportError, Result};
use crate::extractor::render::{save_blob_as_png, ResizePolicy};
use crate::extractor::report::{ExportReport, ExportedImage};
use crate::package::{DocxPackage, Part};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One export resolved ahead of decoding: the image that becomes `<ordinal>.png`.
#[derive(Debug, Clone)]
pub struct PlannedImage<'a> {
    pub ordinal: usize,
    pub r_id: String,
    pub shape_name: Option<String>,
    pub part: Part<'a>,
}

impl PlannedImage<'_> {
    pub fn file_name(&self) -> String {
        format!("{}.png", self.ordinal)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportPlan<'a> {
    pub images: Vec<PlannedImage<'a>>,
    pub shapes_total: usize,
    pub shapes_without_image: usize,
    /// Identifiers with no part behind them, in first-occurrence order
    pub unresolved: Vec<String>,
}

impl ExportPlan<'_> {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Walk the inline shapes in document order and number each distinct,
/// resolvable relationship identifier by its first occurrence.
pub fn plan_exports(package: &DocxPackage) -> Result<ExportPlan<'_>> {
    let shapes = package.inline_shapes()?;
    let mut plan = ExportPlan {
        shapes_total: shapes.len(),
        ..ExportPlan::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for shape in &shapes {
        let Some(r_id) = shape.embed_id() else {
            plan.shapes_without_image += 1;
            continue;
        };

        if !seen.insert(r_id.to_string()) {
            continue;
        }

        match package.related_part(r_id) {
            Some(part) => {
                let ordinal = plan.images.len() + 1;
                plan.images.push(PlannedImage {
                    ordinal,
                    r_id: r_id.to_string(),
                    shape_name: shape.name().map(str::to_string),
                    part,
                });
            }
            None => {
                tracing::debug!(r_id, "skipping inline shape with unresolved relationship");
                plan.unresolved.push(r_id.to_string());
            }
        }
    }

    Ok(plan)
}

#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub images_exported: usize,
    pub total_images: usize,
    pub current_image: Option<String>,
    pub start_time: Instant,
}

impl ExportProgress {
    pub fn new(total_images: usize) -> Self {
        Self {
            images_exported: 0,
            total_images,
            current_image: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_image(&mut self, file_name: String) {
        self.images_exported += 1;
        self.current_image = Some(file_name);
    }

    pub fn percentage(&self) -> f64 {
        if self.total_images == 0 {
            0.0
        } else {
            (self.images_exported as f64 / self.total_images as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Everything one export run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub document_path: PathBuf,
    pub output_dir: PathBuf,
    pub policy: ResizePolicy,
}

impl ExportRequest {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(document_path: P, output_dir: Q, policy: ResizePolicy) -> Self {
        Self {
            document_path: document_path.into(),
            output_dir: output_dir.into(),
            policy,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageExporter;

impl ImageExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export every planned image of the request's document, in order.
    ///
    /// The first failing image aborts the run; files already written stay.
    pub fn export(
        &self,
        request: &ExportRequest,
        progress_callback: Option<&dyn Fn(&ExportProgress)>,
    ) -> Result<ExportReport> {
        if request.policy.target_width == 0 {
            return Err(ExportError::InvalidWidth {
                width: request.policy.target_width.into(),
            });
        }

        fs::create_dir_all(&request.output_dir)?;

        let package = DocxPackage::open(&request.document_path)?;
        let plan = plan_exports(&package)?;
        tracing::debug!(
            shapes = plan.shapes_total,
            planned = plan.len(),
            unresolved = plan.unresolved.len(),
            "planned export"
        );

        let mut progress = ExportProgress::new(plan.len());
        let mut images = Vec::with_capacity(plan.len());

        for planned in &plan.images {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let file_name = planned.file_name();
            let out_path = request.output_dir.join(&file_name);
            let rendered = save_blob_as_png(planned.part.blob, &out_path, &request.policy)?;

            tracing::info!(
                ordinal = planned.ordinal,
                r_id = %planned.r_id,
                source = planned.part.partname,
                width = rendered.width,
                height = rendered.height,
                "exported image"
            );

            images.push(ExportedImage::new(planned, out_path, rendered));
            progress.update_image(file_name);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(ExportReport::new(request, images, &plan, progress.elapsed()))
    }
}

/// Export the inline images of `docx_path` into `out_dir`; returns how many were written.
pub fn export_images<P: AsRef<Path>, Q: AsRef<Path>>(
    docx_path: P,
    out_dir: Q,
    target_width: u32,
    upscale: bool,
) -> Result<usize> {
    let request = ExportRequest::new(
        docx_path.as_ref(),
        out_dir.as_ref(),
        ResizePolicy::new(target_width, upscale),
    );
    let report = ImageExporter::new().export(&request, None)?;
    Ok(report.count())
}
