//! Glyph specimen data
//!
//! This library compiles a hand-curated character list into a segment map and
//! resolves that map against a loaded font, producing the per-segment glyph
//! index a specimen viewer displays, along with the viewer's selection state.

mod analytics;
mod charlist;
mod error;
mod features;
mod font;
mod index;
mod names;
mod specimen;
mod types;

// Re-export error type
pub use error::Error;

// Re-export compile and index API
pub use charlist::{
    Compiler, CompilerBuilder, DEFAULT_CHARLIST_PATH, DEFAULT_CHARMAP_PATH, compile,
};
pub use index::build_index;

// Re-export font model
pub use font::{
    AnatomyLine, FontMetrics, FontPoint, FontRect, FontUnits, Glyph, GlyphSource, LoadedFont,
    Outline, PathCommand,
};
pub use ttf_parser::GlyphId;

// Re-export viewer state
pub use analytics::{AnalyticsSink, LogSink, NoopSink, SelectionEvent};
pub use features::{FEATURE_LABELS, feature_caption, feature_label, feature_labels};
pub use names::{NameDatabase, display_name};
pub use specimen::{
    DEFAULT_CODE, DEFAULT_SEGMENT, Resource, Specimen, SpecimenBuilder, SpecimenDetails,
};

// Re-export public types
pub use types::{CharEntry, CompiledCharMap, GlyphEntry, GlyphIndex, Section, codepoint_label};
