//! Read access to a `.docx` package: a ZIP archive of parts tied together by
//! relationship parts.
//!
//! All archive members are read once when the package is opened; lookups
//! afterwards borrow from memory and cannot fail.

pub mod content_types;
pub mod inline_shapes;
pub mod relationships;

pub use content_types::ContentTypes;
pub use inline_shapes::{parse_inline_shapes, InlineShape};
pub use relationships::{Relationship, Relationships, TargetMode};

use crate::error::{ExportError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const OFFICE_DOCUMENT_REL_SUFFIX: &str = "/officeDocument";
const FALLBACK_MAIN_PARTNAME: &str = "/word/document.xml";

/// An embedded part resolved through a relationship.
#[derive(Debug, Clone, Copy)]
pub struct Part<'a> {
    pub partname: &'a str,
    pub content_type: &'a str,
    pub blob: &'a [u8],
}

#[derive(Debug)]
struct StoredPart {
    partname: String,
    blob: Vec<u8>,
}

#[derive(Debug)]
pub struct DocxPackage {
    // keyed by lowercased partname
    parts: HashMap<String, StoredPart>,
    content_types: ContentTypes,
    main_partname: String,
    document_rels: Relationships,
}

impl DocxPackage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = HashMap::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let partname = format!("/{}", entry.name().trim_start_matches('/'));
            let mut blob = Vec::with_capacity(entry.size().min(64 * 1024 * 1024) as usize);
            entry.read_to_end(&mut blob)?;

            parts.insert(partname.to_ascii_lowercase(), StoredPart { partname, blob });
        }

        let content_types = match parts.get(&content_types::CONTENT_TYPES_PARTNAME.to_ascii_lowercase()) {
            Some(stored) => ContentTypes::parse(&stored.blob)?,
            None => {
                tracing::warn!("package has no [Content_Types].xml, content types unknown");
                ContentTypes::default()
            }
        };

        let package_rels = load_relationships(&parts, "/")?;
        let main_partname = package_rels
            .find_by_type_suffix(OFFICE_DOCUMENT_REL_SUFFIX)
            .and_then(|rel| package_rels.target_partname(&rel.r_id))
            .unwrap_or_else(|| FALLBACK_MAIN_PARTNAME.to_string());

        let main_partname = match parts.get(&main_partname.to_ascii_lowercase()) {
            Some(stored) => stored.partname.clone(),
            None => {
                return Err(ExportError::Package {
                    message: format!("main document part {} not found", main_partname),
                })
            }
        };

        let document_rels = load_relationships(&parts, &main_partname)?;

        tracing::debug!(
            parts = parts.len(),
            main = %main_partname,
            relationships = document_rels.len(),
            "opened package"
        );

        Ok(Self {
            parts,
            content_types,
            main_partname,
            document_rels,
        })
    }

    pub fn main_partname(&self) -> &str {
        &self.main_partname
    }

    pub fn document_relationships(&self) -> &Relationships {
        &self.document_rels
    }

    /// Inline shapes of the main document part, in document order.
    pub fn inline_shapes(&self) -> Result<Vec<InlineShape>> {
        let main = self.part(&self.main_partname).ok_or_else(|| ExportError::Package {
            message: format!("main document part {} not found", self.main_partname),
        })?;
        parse_inline_shapes(main.blob, main.partname)
    }

    /// Part reached from the main document part through `r_id`.
    ///
    /// `None` when the identifier is unknown, the relationship is external,
    /// or its target is not stored in the archive.
    pub fn related_part(&self, r_id: &str) -> Option<Part<'_>> {
        let partname = self.document_rels.target_partname(r_id)?;
        let part = self.part(&partname);
        if part.is_none() {
            tracing::debug!(r_id, partname = %partname, "relationship target missing from archive");
        }
        part
    }

    pub fn part(&self, partname: &str) -> Option<Part<'_>> {
        self.parts
            .get(&partname.to_ascii_lowercase())
            .map(|stored| Part {
                partname: &stored.partname,
                content_type: self.content_types.content_type(&stored.partname),
                blob: &stored.blob,
            })
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

fn load_relationships(parts: &HashMap<String, StoredPart>, source_partname: &str) -> Result<Relationships> {
    let rels_partname = relationships::rels_partname(source_partname);
    match parts.get(&rels_partname.to_ascii_lowercase()) {
        Some(stored) => Relationships::parse(&stored.blob, source_partname),
        None => Ok(Relationships::empty(source_partname)),
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    //! In-memory `.docx` builder for tests.

    use image::{DynamicImage, ImageFormat};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    pub struct DocxFixture {
        body: String,
        rels: Vec<(String, String, bool)>,
        media: Vec<(String, Vec<u8>)>,
        include_package_rels: bool,
    }

    impl DocxFixture {
        pub fn new() -> Self {
            Self {
                body: String::new(),
                rels: Vec::new(),
                media: Vec::new(),
                include_package_rels: true,
            }
        }

        /// Store `bytes` at `word/<target>` and relate it as `r_id`.
        pub fn with_media(mut self, r_id: &str, target: &str, bytes: Vec<u8>) -> Self {
            self.rels.push((r_id.to_string(), target.to_string(), false));
            self.media.push((format!("word/{}", target), bytes));
            self
        }

        pub fn with_png(self, r_id: &str, target: &str, width: u32, height: u32) -> Self {
            let bytes = encode(&DynamicImage::new_rgb8(width, height), ImageFormat::Png);
            self.with_media(r_id, target, bytes)
        }

        pub fn with_external(mut self, r_id: &str, target: &str) -> Self {
            self.rels.push((r_id.to_string(), target.to_string(), true));
            self
        }

        /// Relationship without a stored target part.
        pub fn with_dangling(mut self, r_id: &str, target: &str) -> Self {
            self.rels.push((r_id.to_string(), target.to_string(), false));
            self
        }

        pub fn with_picture(mut self, r_id: &str) -> Self {
            self.body.push_str(&format!(
                r#"<w:p><w:r><w:drawing><wp:inline><wp:docPr id="1" name="Picture"/><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
                r_id
            ));
            self
        }

        pub fn with_paragraph(mut self, text: &str) -> Self {
            self.body
                .push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text));
            self
        }

        pub fn without_package_rels(mut self) -> Self {
            self.include_package_rels = false;
            self
        }

        pub fn build(&self) -> Vec<u8> {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer
                .write_all(
                    br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
                )
                .unwrap();

            if self.include_package_rels {
                writer.start_file("_rels/.rels", options).unwrap();
                writer
                    .write_all(
                        br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
                    )
                    .unwrap();
            }

            writer.start_file("word/document.xml", options).unwrap();
            writer
                .write_all(
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
                        self.body
                    )
                    .as_bytes(),
                )
                .unwrap();

            let mut rels = String::from(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            );
            for (r_id, target, external) in &self.rels {
                rels.push_str(&format!(
                    r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{}"{}/>"#,
                    r_id,
                    target,
                    if *external { r#" TargetMode="External""# } else { "" }
                ));
            }
            rels.push_str("</Relationships>");
            writer.start_file("word/_rels/document.xml.rels", options).unwrap();
            writer.write_all(rels.as_bytes()).unwrap();

            for (name, bytes) in &self.media {
                writer.start_file(name.as_str(), options).unwrap();
                writer.write_all(bytes).unwrap();
            }

            writer.finish().unwrap().into_inner()
        }
    }

    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, format).unwrap();
        cursor.into_inner()
    }
}
