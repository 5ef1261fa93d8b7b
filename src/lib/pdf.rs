//! PDF serialization of a laid-out document.
//!
//! The writer walks every [`DrawItem`] and emits printpdf operations. Layout coordinates have
//! their origin at the top-left corner; PDF user space starts at the bottom-left, so every y is
//! flipped against the page height. Embedded faces are added to the document once and shared by
//! all pages; built-in faces use the standard-14 operators.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};
use printpdf::{
    BuiltinFont, Color, FontId, Line, LinePoint, Mm, Op, PaintMode, ParsedFont, PdfDocument,
    PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Polygon, PolygonRing, Pt, Rgb as PdfRgb,
    TextItem, WindingOrder,
};

use crate::fonts::{FontBook, FontFace, FontSlot};
use crate::layout::{DrawItem, RenderedDocument};
use crate::styling::Rgb;
use crate::DocmarkError;

/// How text in one slot is written.
#[derive(Debug, Clone)]
enum FaceRef {
    Embedded(FontId),
    Builtin(BuiltinFont),
}

/// Serializes [`RenderedDocument`]s with a fixed set of faces.
pub struct PdfWriter<'a> {
    fonts: &'a FontBook,
    title: String,
}

impl<'a> PdfWriter<'a> {
    pub fn new(fonts: &'a FontBook) -> Self {
        Self {
            fonts,
            title: "docmark".to_string(),
        }
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Produces the PDF file contents.
    pub fn to_bytes(&self, rendered: &RenderedDocument) -> Result<Vec<u8>, String> {
        let mut doc = PdfDocument::new(&self.title);
        let faces = self.register_faces(&mut doc);

        let width = Mm(rendered.width * 25.4 / 72.0);
        let height = Mm(rendered.height * 25.4 / 72.0);
        let pages: Vec<PdfPage> = rendered
            .pages
            .iter()
            .map(|page| {
                let mut ops = Vec::with_capacity(page.items.len() * 6);
                for item in &page.items {
                    emit_item(&mut ops, item, rendered.height, &faces);
                }
                PdfPage::new(width, height, ops)
            })
            .collect();
        debug!("Serializing {} page(s)", pages.len());
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        for w in &warnings {
            debug!("printpdf: {:?}", w);
        }
        if bytes.is_empty() {
            return Err("PDF serializer produced no output".to_string());
        }
        Ok(bytes)
    }

    /// Writes the PDF to `path`. The file appears only once it is complete.
    pub fn write(&self, rendered: &RenderedDocument, path: &Path) -> Result<(), DocmarkError> {
        let bytes = self
            .to_bytes(rendered)
            .map_err(|message| DocmarkError::serialization(path, message))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| DocmarkError::serialization(path, e.to_string()))?;
        tmp.write_all(&bytes)
            .map_err(|e| DocmarkError::serialization(path, e.to_string()))?;
        tmp.persist(path)
            .map_err(|e| DocmarkError::serialization(path, e.error.to_string()))?;

        info!(
            "Wrote {} ({} page(s), {} bytes)",
            path.display(),
            rendered.page_count(),
            bytes.len()
        );
        Ok(())
    }

    /// Adds each distinct embedded face to `doc` once.
    fn register_faces(&self, doc: &mut PdfDocument) -> HashMap<FontSlot, FaceRef> {
        let mut by_path: HashMap<&Path, FontId> = HashMap::new();
        let mut faces = HashMap::new();

        for slot in FontSlot::ALL {
            let face = match self.fonts.face(slot) {
                FontFace::Builtin(font) => FaceRef::Builtin(*font),
                FontFace::Embedded { path, bytes, .. } => {
                    if let Some(id) = by_path.get(path.as_path()) {
                        FaceRef::Embedded(id.clone())
                    } else {
                        let mut warnings = Vec::new();
                        match ParsedFont::from_bytes(bytes, 0, &mut warnings) {
                            Some(parsed) => {
                                let id = doc.add_font(&parsed);
                                by_path.insert(path.as_path(), id.clone());
                                FaceRef::Embedded(id)
                            }
                            None => {
                                warn!(
                                    "{} cannot be embedded; {} text uses a built-in font",
                                    path.display(),
                                    slot.name()
                                );
                                FaceRef::Builtin(fallback_builtin(slot))
                            }
                        }
                    }
                }
            };
            faces.insert(slot, face);
        }
        faces
    }
}

fn fallback_builtin(slot: FontSlot) -> BuiltinFont {
    match slot {
        FontSlot::Regular => BuiltinFont::Helvetica,
        FontSlot::Bold => BuiltinFont::HelveticaBold,
        FontSlot::Italic => BuiltinFont::HelveticaOblique,
        FontSlot::Mono => BuiltinFont::Courier,
    }
}

/// Built-in fonts only encode Latin-1; other characters become `?`.
fn latin_only(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(PdfRgb {
        r: f32::from(rgb.0) / 255.0,
        g: f32::from(rgb.1) / 255.0,
        b: f32::from(rgb.2) / 255.0,
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point {
            x: Pt(x),
            y: Pt(y),
        },
        bezier: false,
    }
}

fn emit_item(
    ops: &mut Vec<Op>,
    item: &DrawItem,
    page_height: f32,
    faces: &HashMap<FontSlot, FaceRef>,
) {
    match item {
        DrawItem::Text {
            x,
            baseline,
            text,
            font,
            size,
            color: rgb,
        } => {
            let face = faces
                .get(font)
                .cloned()
                .unwrap_or_else(|| FaceRef::Builtin(fallback_builtin(*font)));
            ops.push(Op::SaveGraphicsState);
            ops.push(Op::SetFillColor { col: color(*rgb) });
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(*x),
                    y: Pt(page_height - baseline),
                },
            });
            match face {
                FaceRef::Embedded(id) => {
                    ops.push(Op::SetFontSize {
                        size: Pt(*size),
                        font: id.clone(),
                    });
                    ops.push(Op::WriteText {
                        items: vec![TextItem::Text(text.clone())],
                        font: id,
                    });
                }
                FaceRef::Builtin(font) => {
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(*size),
                        font,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(latin_only(text))],
                        font,
                    });
                }
            }
            ops.push(Op::EndTextSection);
            ops.push(Op::RestoreGraphicsState);
        }
        DrawItem::Line {
            from,
            to,
            color: rgb,
            width,
        } => {
            ops.push(Op::SaveGraphicsState);
            ops.push(Op::SetOutlineColor { col: color(*rgb) });
            ops.push(Op::SetOutlineThickness { pt: Pt(*width) });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        point(from.0, page_height - from.1),
                        point(to.0, page_height - to.1),
                    ],
                    is_closed: false,
                },
            });
            ops.push(Op::RestoreGraphicsState);
        }
        DrawItem::FillRect {
            x,
            y,
            width,
            height,
            color: rgb,
        } => {
            let top = page_height - y;
            let bottom = top - height;
            ops.push(Op::SaveGraphicsState);
            ops.push(Op::SetFillColor { col: color(*rgb) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: vec![
                            point(*x, bottom),
                            point(x + width, bottom),
                            point(x + width, top),
                            point(*x, top),
                        ],
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
            ops.push(Op::RestoreGraphicsState);
        }
    }
}
