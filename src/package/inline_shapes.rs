//! Inline shapes of the main document part, in document order.
//!
//! An inline shape is a `wp:inline` element sitting directly in a run's
//! drawing (`w:p/w:r/w:drawing/wp:inline`). Its picture data is named by the
//! `r:embed` attribute found along a fixed path:
//!
//! ```xml
//! <wp:inline>
//!   <wp:docPr id="1" name="Picture 1"/>
//!   <a:graphic>
//!     <a:graphicData>
//!       <pic:pic>
//!         <pic:blipFill>
//!           <a:blip r:embed="rId5"/>
//!         </pic:blipFill>
//!       </pic:pic>
//!     </a:graphicData>
//!   </a:graphic>
//! </wp:inline>
//! ```
//!
//! Only the first matching child is followed at each step. Shapes without
//! that path (charts, SmartArt, linked-only pictures) carry no identifier.

use crate::error::{ExportError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const INLINE_PARENTS: [&[u8]; 3] = [b"p", b"r", b"drawing"];
const BLIP_PATH: [&[u8]; 5] = [b"graphic", b"graphicData", b"pic", b"blipFill", b"blip"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineShape {
    embed: Option<String>,
    name: Option<String>,
}

impl InlineShape {
    /// Relationship identifier of the picture part, if the shape has one.
    pub fn embed_id(&self) -> Option<&str> {
        self.embed.as_deref()
    }

    /// Name from `wp:docPr`, e.g. "Picture 3".
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Traversal state for one open `wp:inline` element.
struct ShapeCursor {
    index: usize,
    depth: usize,
    matched: usize,
    taken: [bool; BLIP_PATH.len()],
}

impl ShapeCursor {
    fn new(index: usize, depth: usize) -> Self {
        Self {
            index,
            depth,
            matched: 0,
            taken: [false; BLIP_PATH.len()],
        }
    }

    /// Returns true when `local_name` at `depth` is the next step of the blip path.
    fn advance(&mut self, local_name: &[u8], depth: usize) -> bool {
        let step = self.matched;
        if step >= BLIP_PATH.len() || self.taken[step] {
            return false;
        }
        if depth != self.depth + step + 1 || local_name != BLIP_PATH[step] {
            return false;
        }
        self.taken[step] = true;
        true
    }

    fn reached_blip(&self) -> bool {
        self.matched + 1 == BLIP_PATH.len()
    }
}

pub fn parse_inline_shapes(xml: &[u8], part: &str) -> Result<Vec<InlineShape>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut shapes: Vec<InlineShape> = Vec::new();
    let mut cursors: Vec<ShapeCursor> = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = e.local_name().as_ref().to_vec();
                let depth = stack.len();

                if local_name == b"inline" && has_inline_parents(&stack) {
                    cursors.push(ShapeCursor::new(shapes.len(), depth));
                    shapes.push(InlineShape::default());
                } else {
                    for cursor in cursors.iter_mut() {
                        if cursor.advance(&local_name, depth) {
                            if cursor.reached_blip() {
                                set_embed(&mut shapes[cursor.index], e, part)?;
                            }
                            cursor.matched += 1;
                        }
                    }
                    read_doc_pr(&mut shapes, &cursors, &local_name, depth, e, part)?;
                }

                stack.push(local_name);
            }
            Ok(Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let local_name = local_name.as_ref();
                let depth = stack.len();

                if local_name == b"inline" && has_inline_parents(&stack) {
                    shapes.push(InlineShape::default());
                } else {
                    for cursor in cursors.iter_mut() {
                        // An empty element closes immediately, so the path stops here
                        if cursor.advance(local_name, depth) && cursor.reached_blip() {
                            set_embed(&mut shapes[cursor.index], e, part)?;
                        }
                    }
                    read_doc_pr(&mut shapes, &cursors, local_name, depth, e, part)?;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                let depth = stack.len();

                if cursors.last().is_some_and(|cursor| cursor.depth == depth) {
                    cursors.pop();
                }
                for cursor in cursors.iter_mut() {
                    if cursor.matched > 0 && cursor.depth + cursor.matched == depth {
                        cursor.matched -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExportError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

fn has_inline_parents(stack: &[Vec<u8>]) -> bool {
    stack.len() >= INLINE_PARENTS.len()
        && stack[stack.len() - INLINE_PARENTS.len()..]
            .iter()
            .zip(INLINE_PARENTS)
            .all(|(open, expected)| open.as_slice() == expected)
}

fn set_embed(shape: &mut InlineShape, blip: &BytesStart<'_>, part: &str) -> Result<()> {
    for attr in blip.attributes() {
        let attr = attr.map_err(|e| ExportError::xml(part, e))?;
        let key = attr.key.as_ref();
        // Namespaced only; a bare `embed` is not the relationship attribute
        if key.ends_with(b":embed") {
            // Used verbatim as a relationship key, so no trimming
            let value = attr.unescape_value().map_err(|e| ExportError::xml(part, e))?;
            if !value.is_empty() {
                shape.embed = Some(value.to_string());
            }
            break;
        }
    }
    Ok(())
}

fn read_doc_pr(
    shapes: &mut [InlineShape],
    cursors: &[ShapeCursor],
    local_name: &[u8],
    depth: usize,
    element: &BytesStart<'_>,
    part: &str,
) -> Result<()> {
    let Some(cursor) = cursors.last() else {
        return Ok(());
    };
    if local_name != b"docPr" || depth != cursor.depth + 1 {
        return Ok(());
    }

    for attr in element.attributes() {
        let attr = attr.map_err(|e| ExportError::xml(part, e))?;
        if attr.key.as_ref() == b"name" {
            let value = attr.unescape_value().map_err(|e| ExportError::xml(part, e))?;
            shapes[cursor.index].name = Some(value.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(r_id: &str) -> String {
        format!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0">
                <wp:extent cx="952500" cy="952500"/>
                <wp:docPr id="1" name="Picture {r_id}"/>
                <a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
                  <a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">
                    <pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
                      <pic:nvPicPr><pic:cNvPr id="0" name="image.png"/><pic:cNvPicPr/></pic:nvPicPr>
                      <pic:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>
                    </pic:pic>
                  </a:graphicData>
                </a:graphic>
              </wp:inline></w:drawing></w:r>"#
        )
    }

    fn document(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>{body}</w:body>
</w:document>"#
        )
        .into_bytes()
    }

    fn embed_ids(shapes: &[InlineShape]) -> Vec<Option<&str>> {
        shapes.iter().map(InlineShape::embed_id).collect()
    }

    #[test]
    fn test_shapes_in_document_order() {
        let body = format!(
            "<w:p>{}<w:r><w:t>text</w:t></w:r>{}</w:p><w:p>{}</w:p>",
            picture("rId7"),
            picture("rId5"),
            picture("rId7")
        );
        let shapes = parse_inline_shapes(&document(&body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![Some("rId7"), Some("rId5"), Some("rId7")]);
        assert_eq!(shapes[1].name(), Some("Picture rId5"));
    }

    #[test]
    fn test_text_only_document() {
        let xml = document("<w:p><w:r><w:t>Text only</w:t></w:r></w:p>");
        let shapes = parse_inline_shapes(&xml, "/word/document.xml").unwrap();
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_shapes_inside_tables() {
        let body = format!(
            "<w:tbl><w:tr><w:tc><w:p>{}</w:p></w:tc></w:tr></w:tbl><w:p>{}</w:p>",
            picture("rId9"),
            picture("rId2")
        );
        let shapes = parse_inline_shapes(&document(&body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![Some("rId9"), Some("rId2")]);
    }

    #[test]
    fn test_chart_shape_has_no_identifier() {
        let body = r#"<w:p><w:r><w:drawing><wp:inline>
            <wp:docPr id="3" name="Chart 1"/>
            <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">
              <c:chart r:id="rId12"/>
            </a:graphicData></a:graphic>
          </wp:inline></w:drawing></w:r></w:p>"#;
        let shapes = parse_inline_shapes(&document(body), "/word/document.xml").unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].embed_id(), None);
        assert_eq!(shapes[0].name(), Some("Chart 1"));
    }

    #[test]
    fn test_linked_picture_has_no_identifier() {
        let body = r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData>
            <pic:pic><pic:blipFill><a:blip r:link="rId3"/></pic:blipFill></pic:pic>
          </a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;
        let shapes = parse_inline_shapes(&document(body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![None]);
    }

    #[test]
    fn test_only_first_picture_is_followed() {
        let body = r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData>
            <pic:pic><pic:blipFill/></pic:pic>
            <pic:pic><pic:blipFill><a:blip r:embed="rId8"/></pic:blipFill></pic:pic>
          </a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;
        let shapes = parse_inline_shapes(&document(body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![None]);
    }

    #[test]
    fn test_anchored_and_alternate_content_are_ignored() {
        let body = format!(
            r#"<w:p><w:r><w:drawing><wp:anchor><a:graphic><a:graphicData><pic:pic>
                 <pic:blipFill><a:blip r:embed="rId20"/></pic:blipFill>
               </pic:pic></a:graphicData></a:graphic></wp:anchor></w:drawing></w:r>
               <w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wp:inline>
                 <a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId21"/></pic:blipFill></pic:pic></a:graphicData></a:graphic>
               </wp:inline></w:drawing></mc:Choice></mc:AlternateContent></w:r>{}</w:p>"#,
            picture("rId4")
        );
        let shapes = parse_inline_shapes(&document(&body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![Some("rId4")]);
    }

    #[test]
    fn test_embed_value_is_kept_verbatim() {
        let body = format!(
            r#"<w:p>{}<w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic>
                 <pic:blipFill><a:blip r:embed=""/></pic:blipFill>
               </pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            picture(" rId5 ")
        );
        let shapes = parse_inline_shapes(&document(&body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![Some(" rId5 "), None]);
    }

    #[test]
    fn test_empty_inline_element() {
        let body = "<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>";
        let shapes = parse_inline_shapes(&document(body), "/word/document.xml").unwrap();
        assert_eq!(embed_ids(&shapes), vec![None]);
    }

    #[test]
    fn test_malformed_document() {
        let xml = b"<w:document><w:body><w:p></w:r></w:body></w:document>";
        let result = parse_inline_shapes(xml, "/word/document.xml");
        assert!(matches!(result, Err(ExportError::Xml { .. })));
    }
}
