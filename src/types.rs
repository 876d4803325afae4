use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::Error;
use crate::font::Glyph;

/// One line of the charlist: a code point and the feature variants it is shown with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharEntry {
    pub code: u32,
    #[serde(rename = "feat", default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl CharEntry {
    pub fn new(code: u32) -> Self {
        CharEntry {
            code,
            features: None,
        }
    }

    pub fn with_features<I, S>(code: u32, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CharEntry {
            code,
            features: Some(features.into_iter().map(Into::into).collect()),
        }
    }

    /// Active feature tags. An absent list and an empty list both read as none.
    pub fn features(&self) -> &[String] {
        self.features.as_deref().unwrap_or(&[])
    }

    pub fn char(&self) -> Option<char> {
        char::from_u32(self.code)
    }
}

/// A named script segment and its entries in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<CharEntry>,
}

/// Segment name to entries, in charlist order.
///
/// Serializes as a JSON object whose key order matches section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledCharMap {
    sections: Vec<Section>,
}

impl CompiledCharMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section. A name that is already present keeps its position
    /// and has its entries replaced.
    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<CharEntry>) {
        let name = name.into();
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(section) => {
                debug!("segment {:?} appears twice, replacing earlier entries", name);
                section.entries = entries;
            }
            None => self.sections.push(Section { name, entries }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[CharEntry]> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Single-line JSON.
    pub fn to_json_compact(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the artifact next to `path` first and renames it into place,
    /// so a failed write never leaves a truncated file behind.
    pub fn write_artifact<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<(), Error> {
        let path = path.as_ref();
        let mut json = if pretty {
            self.to_json()?
        } else {
            self.to_json_compact()?
        };
        json.push('\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!("wrote {} segments to {}", self.len(), path.display());
        Ok(())
    }
}

impl Serialize for CompiledCharMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, &section.entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CompiledCharMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CharMapVisitor;

        impl<'de> Visitor<'de> for CharMapVisitor {
            type Value = CompiledCharMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of segment names to character entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = CompiledCharMap::new();
                while let Some((name, entries)) = access.next_entry::<String, Vec<CharEntry>>()? {
                    map.insert(name, entries);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CharMapVisitor)
    }
}

/// A charlist entry resolved against a loaded font.
///
/// The glyph is borrowed from the font and lives as long as it does.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphEntry<'f> {
    pub code: u32,
    pub features: Option<Vec<String>>,
    pub glyph: &'f Glyph,
}

impl<'f> GlyphEntry<'f> {
    pub fn new(entry: &CharEntry, glyph: &'f Glyph) -> Self {
        GlyphEntry {
            code: entry.code,
            features: entry.features.clone(),
            glyph,
        }
    }

    pub fn features(&self) -> &[String] {
        self.features.as_deref().unwrap_or(&[])
    }

    pub fn char(&self) -> Option<char> {
        char::from_u32(self.code)
    }

    /// Same code, same features and the very same glyph in the same font.
    pub fn is_same(&self, other: &GlyphEntry<'_>) -> bool {
        self.code == other.code
            && self.features == other.features
            && std::ptr::eq(self.glyph, other.glyph)
    }

    /// Hover title for a glyph list item, taken from the glyph's own first Unicode value.
    pub fn title(&self) -> String {
        codepoint_label(self.glyph.unicode.first().copied().unwrap_or(self.code))
    }

    /// Space-separated feature tags, used as style classes.
    pub fn class_list(&self) -> String {
        self.features().join(" ")
    }
}

/// Resolved glyph entries per segment, in charlist order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphIndex<'f> {
    segments: Vec<(String, Vec<GlyphEntry<'f>>)>,
}

impl<'f> GlyphIndex<'f> {
    pub(crate) fn push(&mut self, name: String, entries: Vec<GlyphEntry<'f>>) {
        self.segments.push((name, entries));
    }

    pub fn get(&self, segment: &str) -> Option<&[GlyphEntry<'f>]> {
        self.segments
            .iter()
            .find(|(name, _)| name == segment)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GlyphEntry<'f>])> {
        self.segments
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// The entry for `code` in `segment`, if the font had a glyph for it.
    pub fn find(&self, segment: &str, code: u32) -> Option<&GlyphEntry<'f>> {
        self.get(segment)?.iter().find(|e| e.code == code)
    }

    pub fn first(&self) -> Option<&GlyphEntry<'f>> {
        self.segments.iter().flat_map(|(_, entries)| entries).next()
    }

    /// Number of segments, including empty ones.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.segments.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// `U+XXXX`, at least four uppercase hex digits.
pub fn codepoint_label(code: u32) -> String {
    format!("U+{:04X}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompiledCharMap {
        let mut map = CompiledCharMap::new();
        map.insert(
            "Basic Latin",
            vec![CharEntry::new(0x51), CharEntry::with_features(0x61, ["sc"])],
        );
        map.insert("Cyrillic", vec![CharEntry::new(0x410)]);
        map
    }

    #[test]
    fn serializes_in_section_order_without_empty_feat() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"Basic Latin":[{"code":81},{"code":97,"feat":["sc"]}],"Cyrillic":[{"code":1040}]}"#
        );
    }

    #[test]
    fn deserialize_keeps_key_order() {
        let json = r#"{"Zeta":[{"code":1}],"Alpha":[{"code":2,"feat":["osf","numr"]}]}"#;
        let map = CompiledCharMap::from_json(json).unwrap();
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["Zeta", "Alpha"]);
        assert_eq!(map.get("Alpha").unwrap()[0].features(), ["osf", "numr"]);
        assert!(map.get("Zeta").unwrap()[0].features.is_none());
    }

    #[test]
    fn duplicate_segment_replaces_in_place() {
        let mut map = sample();
        map.insert("Basic Latin", vec![CharEntry::new(0x41)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.sections()[0].name, "Basic Latin");
        assert_eq!(map.get("Basic Latin").unwrap(), [CharEntry::new(0x41)]);
    }

    #[test]
    fn empty_feature_list_reads_as_none() {
        let entry = CharEntry {
            code: 0x41,
            features: Some(Vec::new()),
        };
        assert!(entry.features().is_empty());
        assert!(CharEntry::new(0x41).features().is_empty());
    }

    #[test]
    fn write_artifact_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib").join("charmap.json");
        sample().write_artifact(&path, true).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"Basic Latin\": ["));
        assert_eq!(CompiledCharMap::load(&path).unwrap(), sample());
        assert!(!dir.path().join("lib").join("charmap.json.tmp").exists());
    }

    #[test]
    fn compact_artifact_is_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charmap.json");
        sample().write_artifact(&path, false).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n", sample().to_json_compact().unwrap()));
        assert_eq!(CompiledCharMap::load(&path).unwrap(), sample());
    }

    #[test]
    fn labels_pad_to_four_digits() {
        assert_eq!(codepoint_label(0x51), "U+0051");
        assert_eq!(codepoint_label(0x1F600), "U+1F600");
    }
}
