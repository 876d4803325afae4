use tracing::debug;

use crate::font::GlyphSource;
use crate::types::{CompiledCharMap, GlyphEntry, GlyphIndex};

/// Resolve every charlist entry against `font`.
///
/// Entries the font has no glyph for are dropped. Every segment of
/// `char_map` appears in the result, in order, even when all of its entries
/// were dropped. Neither input is modified.
pub fn build_index<'f, F>(char_map: &CompiledCharMap, font: &'f F) -> GlyphIndex<'f>
where
    F: GlyphSource + ?Sized,
{
    let mut index = GlyphIndex::default();
    let mut missing = 0usize;

    for section in char_map.sections() {
        let entries = section
            .entries
            .iter()
            .filter_map(|entry| {
                let glyph = font.glyph_id(entry.code).and_then(|id| font.glyph(id));
                if glyph.is_none() {
                    missing += 1;
                    report_missing(entry.code);
                }
                glyph.map(|glyph| GlyphEntry::new(entry, glyph))
            })
            .collect();
        index.push(section.name.clone(), entries);
    }

    debug!(
        "indexed {} glyphs across {} segments, {} missing",
        index.glyph_count(),
        index.len(),
        missing
    );
    index
}

#[cfg(debug_assertions)]
fn report_missing(code: u32) {
    tracing::warn!("Missing glyph for 0x{:04X}", code);
}

#[cfg(not(debug_assertions))]
fn report_missing(_code: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charlist::compile;
    use crate::font::{FontMetrics, Glyph, LoadedFont};
    use crate::types::CharEntry;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use ttf_parser::GlyphId;

    #[derive(Clone, Default)]
    struct WarningLog(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for WarningLog {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::WARN {
                return;
            }
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }

    fn warnings_while<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let log = WarningLog::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let value = tracing::subscriber::with_default(subscriber, f);
        let warnings = log.0.lock().unwrap().clone();
        (value, warnings)
    }

    fn latin_font() -> LoadedFont {
        LoadedFont::from_parts(
            [(0x51, GlyphId(1)), (0x61, GlyphId(2))],
            vec![
                Glyph::new(GlyphId(0), Some(".notdef"), vec![]),
                Glyph::new(GlyphId(1), Some("Q"), vec![0x51]),
                Glyph::new(GlyphId(2), Some("a"), vec![0x61]),
            ],
            FontMetrics::default(),
        )
    }

    fn char_map() -> CompiledCharMap {
        compile("Basic Latin\n51\n61.sc\n\nCyrillic\n410\n").unwrap()
    }

    #[test_log::test]
    fn missing_code_points_leave_empty_segments() {
        let font = latin_font();
        let index = build_index(&char_map(), &font);

        assert_eq!(
            index.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["Basic Latin", "Cyrillic"]
        );
        let latin = index.get("Basic Latin").unwrap();
        assert_eq!(latin.len(), 2);
        assert_eq!(latin[0].glyph.name.as_deref(), Some("Q"));
        assert_eq!(latin[1].features(), ["sc"]);
        assert!(index.get("Cyrillic").unwrap().is_empty());
    }

    #[test]
    fn one_diagnostic_per_missing_code_point() {
        let font = latin_font();
        let map = char_map();
        let (index, warnings) = warnings_while(|| build_index(&map, &font));

        assert_eq!(index.glyph_count(), 2);
        if cfg!(debug_assertions) {
            assert_eq!(warnings, vec!["Missing glyph for 0x0410".to_string()]);
        } else {
            assert!(warnings.is_empty());
        }
    }

    #[test]
    fn no_diagnostics_when_everything_resolves() {
        let font = latin_font();
        let map = compile("Basic Latin\n51\n61.sc\n").unwrap();
        let (_, warnings) = warnings_while(|| build_index(&map, &font));
        assert!(warnings.is_empty());
    }

    #[test_log::test]
    fn dangling_glyph_id_is_dropped() {
        let font = LoadedFont::from_parts(
            [(0x51, GlyphId(1)), (0x52, GlyphId(40))],
            vec![
                Glyph::new(GlyphId(0), None, vec![]),
                Glyph::new(GlyphId(1), Some("Q"), vec![0x51]),
            ],
            FontMetrics::default(),
        );
        let mut map = CompiledCharMap::new();
        map.insert("Latin", vec![CharEntry::new(0x52), CharEntry::new(0x51)]);

        let index = build_index(&map, &font);
        let latin = index.get("Latin").unwrap();
        assert_eq!(latin.len(), 1);
        assert_eq!(latin[0].code, 0x51);
    }

    #[test]
    fn entry_order_follows_charlist() {
        let font = latin_font();
        let map = compile("Latin\n61\n51\n61.sc\n").unwrap();
        let index = build_index(&map, &font);
        let codes: Vec<_> = index.get("Latin").unwrap().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![0x61, 0x51, 0x61]);
    }

    #[test]
    fn glyphs_are_borrowed_not_copied() {
        let font = latin_font();
        let index = build_index(&char_map(), &font);
        let q = index.find("Basic Latin", 0x51).unwrap();
        assert!(std::ptr::eq(q.glyph, &font.glyphs()[1]));
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let font = latin_font();
        let map = char_map();
        assert_eq!(build_index(&map, &font), build_index(&map, &font));
    }

    #[test]
    fn works_through_trait_objects() {
        let font = latin_font();
        let source: &dyn GlyphSource = &font;
        let index = build_index(&char_map(), source);
        assert_eq!(index.glyph_count(), 2);
    }
}
