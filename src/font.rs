use std::collections::BTreeMap;

use euclid::{Point2D, Rect, point2, size2};
use tracing::debug;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::error::Error;

pub struct FontUnits;
pub type FontPoint = Point2D<f32, FontUnits>;
pub type FontRect = Rect<f32, FontUnits>;

/// Anything `build_index` can resolve code points against.
pub trait GlyphSource {
    /// Glyph id the character map assigns to `code`.
    fn glyph_id(&self, code: u32) -> Option<GlyphId>;
    /// The glyph table record for `id`, if the table has one.
    fn glyph(&self, id: GlyphId) -> Option<&Glyph>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(FontPoint),
    LineTo(FontPoint),
    QuadTo(FontPoint, FontPoint),
    CurveTo(FontPoint, FontPoint, FontPoint),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub commands: Vec<PathCommand>,
    pub bounds: Option<FontRect>,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn contour_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo(_)))
            .count()
    }
}

#[derive(Default)]
struct OutlineCollector {
    commands: Vec<PathCommand>,
}

impl OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo(point2(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo(point2(x, y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.commands
            .push(PathCommand::QuadTo(point2(x1, y1), point2(x, y)));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::CurveTo(
            point2(x1, y1),
            point2(x2, y2),
            point2(x, y),
        ));
    }

    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
}

/// One record of the font's glyph table.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub id: GlyphId,
    pub name: Option<String>,
    /// Every Unicode value the character map points at this glyph, ascending.
    pub unicode: Vec<u32>,
    pub advance_width: Option<u16>,
    pub outline: Outline,
}

impl Glyph {
    pub fn new(id: GlyphId, name: Option<&str>, unicode: Vec<u32>) -> Self {
        Glyph {
            id,
            name: name.map(str::to_string),
            unicode,
            advance_width: None,
            outline: Outline::default(),
        }
    }
}

/// Vertical metrics in font units. The baseline is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
}

impl Default for FontMetrics {
    fn default() -> Self {
        FontMetrics {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            x_height: None,
            cap_height: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnatomyLine {
    pub label: &'static str,
    pub value: i16,
}

impl FontMetrics {
    pub const BASELINE: i16 = 0;

    /// Guide lines drawn next to the specimen, top to bottom.
    pub fn anatomy(&self) -> Vec<AnatomyLine> {
        let mut lines = Vec::with_capacity(4);
        match self.cap_height {
            Some(cap) if cap != self.ascender => {
                lines.push(AnatomyLine {
                    label: "ASCENDER",
                    value: self.ascender,
                });
                lines.push(AnatomyLine {
                    label: "CAP HEIGHT",
                    value: cap,
                });
            }
            _ => lines.push(AnatomyLine {
                label: "ASCENDER / CAP HEIGHT",
                value: self.ascender,
            }),
        }
        if let Some(x_height) = self.x_height {
            lines.push(AnatomyLine {
                label: "X-HEIGHT",
                value: x_height,
            });
        }
        lines.push(AnatomyLine {
            label: "BASELINE",
            value: Self::BASELINE,
        });
        lines.push(AnatomyLine {
            label: "DESCENDER",
            value: self.descender,
        });
        lines
    }
}

/// A parsed font reduced to what the specimen needs: the character map,
/// the glyph table and vertical metrics. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct LoadedFont {
    family_name: Option<String>,
    cmap: BTreeMap<u32, GlyphId>,
    glyphs: Vec<Glyph>,
    metrics: FontMetrics,
}

impl LoadedFont {
    /// Parse face `index` of a TrueType/OpenType file or collection.
    pub fn from_bytes(data: &[u8], index: u32) -> Result<Self, Error> {
        let face = Face::parse(data, index)?;
        Ok(Self::from_face(&face))
    }

    pub fn from_face(face: &Face<'_>) -> Self {
        let mut cmap = BTreeMap::new();
        let mut unicode: BTreeMap<GlyphId, Vec<u32>> = BTreeMap::new();

        for subtable in face.tables().cmap.iter().flat_map(|cmap| cmap.subtables) {
            if !subtable.is_unicode() {
                debug!(
                    "skipping cmap subtable platform={:?} encoding={}",
                    subtable.platform_id, subtable.encoding_id
                );
                continue;
            }
            subtable.codepoints(|codepoint| {
                if let Some(gid) = subtable.glyph_index(codepoint) {
                    if gid.0 == 0 {
                        return;
                    }
                    cmap.entry(codepoint).or_insert(gid);
                    let codes = unicode.entry(gid).or_default();
                    if !codes.contains(&codepoint) {
                        codes.push(codepoint);
                    }
                }
            });
        }

        let glyphs = (0..face.number_of_glyphs())
            .map(|id| {
                let id = GlyphId(id);
                let mut collector = OutlineCollector::default();
                let bounds = face.outline_glyph(id, &mut collector).map(|r| {
                    Rect::new(
                        point2(r.x_min as f32, r.y_min as f32),
                        size2(r.width() as f32, r.height() as f32),
                    )
                });
                let mut codes = unicode.remove(&id).unwrap_or_default();
                codes.sort_unstable();
                Glyph {
                    id,
                    name: face.glyph_name(id).map(str::to_string),
                    unicode: codes,
                    advance_width: face.glyph_hor_advance(id),
                    outline: Outline {
                        commands: collector.commands,
                        bounds,
                    },
                }
            })
            .collect::<Vec<_>>();

        let family_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
            .find_map(|name| name.to_string());

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            x_height: face.x_height(),
            cap_height: face.capital_height(),
        };

        debug!(
            "loaded font {:?}: {} glyphs, {} mapped code points",
            family_name,
            glyphs.len(),
            cmap.len()
        );

        LoadedFont {
            family_name,
            cmap,
            glyphs,
            metrics,
        }
    }

    /// Assemble a font from an explicit character map and glyph table.
    /// `glyphs[n]` is the glyph with id `n`.
    pub fn from_parts<I>(cmap: I, glyphs: Vec<Glyph>, metrics: FontMetrics) -> Self
    where
        I: IntoIterator<Item = (u32, GlyphId)>,
    {
        LoadedFont {
            family_name: None,
            cmap: cmap.into_iter().collect(),
            glyphs,
            metrics,
        }
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn mapped_code_points(&self) -> usize {
        self.cmap.len()
    }
}

impl GlyphSource for LoadedFont {
    fn glyph_id(&self, code: u32) -> Option<GlyphId> {
        self.cmap.get(&code).copied()
    }

    fn glyph(&self, id: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(usize::from(id.0))
    }
}
