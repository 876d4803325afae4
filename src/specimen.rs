//! Specimen viewer state.
//!
//! [`Specimen`] holds the viewer's inputs (char map, font, name database)
//! and the values derived from them. Inputs carry a revision that is bumped
//! only when a different reference is supplied; the glyph index is recomputed
//! synchronously when, and only when, one of its inputs' revisions moved.

use tracing::{debug, warn};

use crate::analytics::{AnalyticsSink, NoopSink, SelectionEvent};
use crate::features::feature_caption;
use crate::font::{AnatomyLine, LoadedFont};
use crate::index::build_index;
use crate::names::{NameDatabase, display_name};
use crate::types::{CompiledCharMap, GlyphEntry, GlyphIndex, codepoint_label};

pub const DEFAULT_SEGMENT: &str = "Basic Latin";
pub const DEFAULT_CODE: u32 = 0x51;

/// An input that may still be loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<T> {
    Pending,
    Ready(T),
}

impl<T> Resource<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Resource::Pending => None,
            Resource::Ready(value) => Some(value),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resource::Ready(_))
    }
}

#[derive(Debug)]
struct Input<T> {
    value: T,
    revision: u64,
}

impl<T> Input<T> {
    fn new(value: T) -> Self {
        Input { value, revision: 0 }
    }

    fn set(&mut self, value: T) {
        self.value = value;
        self.revision += 1;
    }
}

/// What the detail panel shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecimenDetails {
    pub name: Option<String>,
    pub features: String,
    pub codepoint: String,
    pub character: Option<char>,
    pub class_list: String,
    pub anatomy: Vec<AnatomyLine>,
}

/// Builder for the viewer state.
///
/// # Examples
///
/// ```no_run
/// use glyph_specimen::{CompiledCharMap, LoadedFont, Specimen};
///
/// let map = CompiledCharMap::load("data/charmap.json")?;
/// let font = LoadedFont::from_bytes(&std::fs::read("font.ttf")?, 0)?;
///
/// let mut specimen = Specimen::builder().default_code(0x41).build(&map);
/// specimen.set_font(&font);
/// println!("{:?}", specimen.details());
/// # Ok::<(), glyph_specimen::Error>(())
/// ```
pub struct SpecimenBuilder<'f> {
    default_segment: String,
    default_code: u32,
    sink: Box<dyn AnalyticsSink + 'f>,
}

impl Default for SpecimenBuilder<'_> {
    fn default() -> Self {
        SpecimenBuilder {
            default_segment: DEFAULT_SEGMENT.to_string(),
            default_code: DEFAULT_CODE,
            sink: Box::new(NoopSink),
        }
    }
}

impl<'f> SpecimenBuilder<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment searched for the glyph selected once the font is ready.
    pub fn default_segment(mut self, segment: impl Into<String>) -> Self {
        self.default_segment = segment.into();
        self
    }

    /// Code point selected once the font is ready.
    pub fn default_code(mut self, code: u32) -> Self {
        self.default_code = code;
        self
    }

    /// Where user selections are reported.
    pub fn analytics(mut self, sink: impl AnalyticsSink + 'f) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn build(self, char_map: &'f CompiledCharMap) -> Specimen<'f> {
        Specimen {
            char_map: Input::new(char_map),
            font: Input::new(Resource::Pending),
            names: Input::new(Resource::Pending),
            index: GlyphIndex::default(),
            index_deps: None,
            selection: None,
            default_segment: self.default_segment,
            default_code: self.default_code,
            sink: self.sink,
        }
    }
}

pub struct Specimen<'f> {
    char_map: Input<&'f CompiledCharMap>,
    font: Input<Resource<&'f LoadedFont>>,
    names: Input<Resource<&'f NameDatabase>>,
    index: GlyphIndex<'f>,
    index_deps: Option<(u64, u64)>,
    selection: Option<GlyphEntry<'f>>,
    default_segment: String,
    default_code: u32,
    sink: Box<dyn AnalyticsSink + 'f>,
}

impl<'f> Specimen<'f> {
    pub fn builder() -> SpecimenBuilder<'f> {
        SpecimenBuilder::new()
    }

    pub fn new(char_map: &'f CompiledCharMap) -> Self {
        SpecimenBuilder::new().build(char_map)
    }

    pub fn set_char_map(&mut self, char_map: &'f CompiledCharMap) {
        if std::ptr::eq(self.char_map.value, char_map) {
            return;
        }
        self.char_map.set(char_map);
        self.refresh();
    }

    /// Font finished loading. Rebuilds the index and applies the default selection.
    pub fn set_font(&mut self, font: &'f LoadedFont) {
        if let Resource::Ready(current) = self.font.value {
            if std::ptr::eq(current, font) {
                return;
            }
        }
        self.font.set(Resource::Ready(font));
        self.refresh();
        self.select_default();
    }

    pub fn set_names(&mut self, names: &'f NameDatabase) {
        if let Resource::Ready(current) = self.names.value {
            if std::ptr::eq(current, names) {
                return;
            }
        }
        self.names.set(Resource::Ready(names));
    }

    pub fn font(&self) -> Resource<&'f LoadedFont> {
        self.font.value
    }

    pub fn is_ready(&self) -> bool {
        self.font.value.is_ready()
    }

    /// Resolved glyphs per segment. Empty until the font is ready.
    pub fn index(&self) -> &GlyphIndex<'f> {
        &self.index
    }

    pub fn selection(&self) -> Option<&GlyphEntry<'f>> {
        self.selection.as_ref()
    }

    pub fn is_selected(&self, entry: &GlyphEntry<'_>) -> bool {
        self.selection.as_ref().is_some_and(|s| s.is_same(entry))
    }

    /// User picked a glyph: replace the selection and report it.
    pub fn select(&mut self, entry: GlyphEntry<'f>) {
        let names = self.names.value.ready().copied();
        let event = SelectionEvent {
            name: display_name(names, &entry).map(str::to_string),
            unicode: entry.code,
            features: entry.features.clone(),
        };
        self.selection = Some(entry);
        self.sink.emit(&event);
    }

    /// Select the first entry for `code` in `segment`. Returns false if the
    /// index has no such entry.
    pub fn select_code(&mut self, segment: &str, code: u32) -> bool {
        match self.index.find(segment, code).cloned() {
            Some(entry) => {
                self.select(entry);
                true
            }
            None => false,
        }
    }

    pub fn details(&self) -> SpecimenDetails {
        let anatomy = match self.font.value {
            Resource::Ready(font) => font.metrics().anatomy(),
            Resource::Pending => Vec::new(),
        };
        let Some(entry) = self.selection.as_ref() else {
            return SpecimenDetails {
                name: None,
                features: String::new(),
                codepoint: codepoint_label(0),
                character: None,
                class_list: String::new(),
                anatomy,
            };
        };
        let names = self.names.value.ready().copied();
        SpecimenDetails {
            name: display_name(names, entry).map(str::to_string),
            features: feature_caption(entry.features()),
            codepoint: codepoint_label(entry.code),
            character: entry.char(),
            class_list: entry.class_list(),
            anatomy,
        }
    }

    /// Increases every time the index is rebuilt; zero before the first build.
    pub fn index_revision(&self) -> u64 {
        self.index_deps
            .map(|(map, font)| map + font + 1)
            .unwrap_or_default()
    }

    fn refresh(&mut self) {
        let deps = (self.char_map.revision, self.font.revision);
        if self.index_deps == Some(deps) {
            return;
        }
        self.index = match self.font.value {
            Resource::Ready(font) => build_index(self.char_map.value, font),
            Resource::Pending => GlyphIndex::default(),
        };
        self.index_deps = Some(deps);
        debug!("glyph index rebuilt at revision {:?}", deps);
    }

    /// Selects the configured default glyph. When it is not in the index the
    /// first indexed glyph is used instead; with an empty index the selection
    /// is cleared.
    fn select_default(&mut self) {
        let entry = match self.index.find(&self.default_segment, self.default_code) {
            Some(entry) => Some(entry.clone()),
            None => {
                warn!(
                    "default glyph {} not found in {:?}, falling back to first glyph",
                    codepoint_label(self.default_code),
                    self.default_segment
                );
                self.index.first().cloned()
            }
        };
        if entry.is_none() {
            warn!("glyph index is empty, nothing selected");
        }
        self.selection = entry;
    }
}
