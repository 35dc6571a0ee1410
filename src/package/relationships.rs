use crate::error::{ExportError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

const TARGET_MODE_EXTERNAL: &str = "External";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Internal,
    External,
}

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }
}

/// Relationships whose source is a single part, keyed by rId.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn empty(source_partname: &str) -> Self {
        Self {
            base_uri: base_uri(source_partname).to_string(),
            rels: HashMap::new(),
        }
    }

    pub fn parse(xml: &[u8], source_partname: &str) -> Result<Self> {
        let part = rels_partname(source_partname);
        let mut relationships = Self::empty(source_partname);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut target_mode = TargetMode::Internal;

                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| ExportError::xml(&part, e))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| ExportError::xml(&part, e))?
                            .to_string();
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(value),
                            b"Type" => reltype = Some(value),
                            b"Target" => target_ref = Some(value),
                            b"TargetMode" if value == TARGET_MODE_EXTERNAL => {
                                target_mode = TargetMode::External
                            }
                            _ => {}
                        }
                    }

                    if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref) {
                        relationships.rels.insert(
                            r_id.clone(),
                            Relationship {
                                r_id,
                                reltype,
                                target_ref,
                                target_mode,
                            },
                        );
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExportError::xml(&part, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }

    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Absolute partname an internal relationship points at.
    ///
    /// External relationships (linked files, hyperlinks) have no part in the
    /// package and yield `None`.
    pub fn target_partname(&self, r_id: &str) -> Option<String> {
        let rel = self.rels.get(r_id)?;
        if rel.is_external() {
            return None;
        }
        Some(resolve_target(&self.base_uri, &rel.target_ref))
    }

    /// First internal relationship whose type URI ends with `suffix`.
    pub fn find_by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        let mut matches: Vec<&Relationship> = self
            .rels
            .values()
            .filter(|rel| !rel.is_external() && rel.reltype.ends_with(suffix))
            .collect();
        // HashMap order is unstable; pick deterministically
        matches.sort_by(|a, b| a.r_id.cmp(&b.r_id));
        matches.into_iter().next()
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

/// Directory portion of a partname: `/word` for `/word/document.xml`.
pub fn base_uri(partname: &str) -> &str {
    match partname.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &partname[..pos],
    }
}

/// Partname of the `.rels` part holding relationships for `source_partname`.
///
/// The package itself (`/`) keeps its relationships in `/_rels/.rels`.
pub fn rels_partname(source_partname: &str) -> String {
    if source_partname == "/" {
        return "/_rels/.rels".to_string();
    }

    let base = base_uri(source_partname);
    let filename = source_partname.rsplit('/').next().unwrap_or_default();
    if base == "/" {
        format!("/_rels/{}.rels", filename)
    } else {
        format!("{}/_rels/{}.rels", base, filename)
    }
}

/// Resolve a relationship target against the source part's directory.
pub fn resolve_target(base_uri: &str, target_ref: &str) -> String {
    let joined = if target_ref.starts_with('/') {
        target_ref.to_string()
    } else if base_uri.ends_with('/') {
        format!("{}{}", base_uri, target_ref)
    } else {
        format!("{}/{}", base_uri, target_ref)
    };
    normalize_path(&joined)
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}
