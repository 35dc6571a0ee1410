use crate::error::{ExportError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

pub const CONTENT_TYPES_PARTNAME: &str = "/[Content_Types].xml";
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// `[Content_Types].xml`: overrides by partname, defaults by extension.
///
/// Both keys are compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut content_types = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let local_name = e.local_name();
                    let is_default = local_name.as_ref() == b"Default";
                    let is_override = local_name.as_ref() == b"Override";

                    if is_default || is_override {
                        let mut key = None;
                        let mut content_type = None;

                        for attr in e.attributes() {
                            let attr =
                                attr.map_err(|e| ExportError::xml(CONTENT_TYPES_PARTNAME, e))?;
                            let value = attr
                                .unescape_value()
                                .map_err(|e| ExportError::xml(CONTENT_TYPES_PARTNAME, e))?;
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => {
                                    key = Some(value.to_ascii_lowercase())
                                }
                                b"ContentType" => content_type = Some(value.to_string()),
                                _ => {}
                            }
                        }

                        if let (Some(key), Some(content_type)) = (key, content_type) {
                            if is_default {
                                content_types.defaults.insert(key, content_type);
                            } else {
                                content_types.overrides.insert(key, content_type);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExportError::xml(CONTENT_TYPES_PARTNAME, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(content_types)
    }

    pub fn content_type(&self, partname: &str) -> &str {
        let partname = partname.to_ascii_lowercase();
        if let Some(content_type) = self.overrides.get(&partname) {
            return content_type;
        }

        let extension = partname
            .rsplit('/')
            .next()
            .and_then(|filename| filename.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .unwrap_or_default();

        self.defaults
            .get(extension)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CONTENT_TYPE)
    }
}
