use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::types::GlyphEntry;

/// Canonical character names keyed by code point.
///
/// Loaded from `UnicodeData.txt`-style records, `CODE;NAME;...`. Lines that
/// are blank or start with `#` are ignored, as are pseudo-names in angle
/// brackets such as `<control>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDatabase {
    names: HashMap<u32, String>,
}

impl NameDatabase {
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut names = HashMap::new();

        for (idx, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(';');
            let code = fields
                .next()
                .and_then(|hex| u32::from_str_radix(hex.trim(), 16).ok())
                .ok_or_else(|| Error::InvalidNameRecord {
                    line_number: idx + 1,
                    line: line.to_string(),
                })?;
            let name = fields.next().map(str::trim).unwrap_or_default();
            if name.is_empty() || name.starts_with('<') {
                continue;
            }
            names.insert(code, name.to_string());
        }

        debug!("loaded {} character names", names.len());
        Ok(NameDatabase { names })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u32, String)> for NameDatabase {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        NameDatabase {
            names: iter.into_iter().collect(),
        }
    }
}

/// Name for a selected glyph: the database's name when there is one,
/// otherwise the glyph's own name.
pub fn display_name<'a>(names: Option<&'a NameDatabase>, entry: &'a GlyphEntry<'_>) -> Option<&'a str> {
    names
        .and_then(|db| db.get(entry.code))
        .or(entry.glyph.name.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Glyph;
    use ttf_parser::GlyphId;

    const DATA: &str = "\
# excerpt
0000;<control>;Cc;0;BN;;;;;N;NULL;;;;
0051;LATIN CAPITAL LETTER Q;Lu;0;L;;;;;N;;;;0071;

0410;CYRILLIC CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0430;
";

    #[test]
    fn parses_records_and_skips_pseudo_names() {
        let db = NameDatabase::parse(DATA).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.get(0x51), Some("LATIN CAPITAL LETTER Q"));
        assert_eq!(db.get(0x0), None);
    }

    #[test]
    fn bad_code_point_is_an_error() {
        let err = NameDatabase::parse("0041;A\nXYZ;NOPE\n").unwrap_err();
        assert!(matches!(err, Error::InvalidNameRecord { line_number: 2, .. }));
    }

    #[test]
    fn display_name_falls_back_to_glyph_name() {
        let db: NameDatabase = [(0x51, "LATIN CAPITAL LETTER Q".to_string())]
            .into_iter()
            .collect();
        let q = Glyph::new(GlyphId(1), Some("Q"), vec![0x51]);
        let a = Glyph::new(GlyphId(2), Some("a.sc"), vec![0x61]);
        let entry_q = GlyphEntry {
            code: 0x51,
            features: None,
            glyph: &q,
        };
        let entry_a = GlyphEntry {
            code: 0x61,
            features: Some(vec!["sc".to_string()]),
            glyph: &a,
        };

        assert_eq!(display_name(Some(&db), &entry_q), Some("LATIN CAPITAL LETTER Q"));
        assert_eq!(display_name(Some(&db), &entry_a), Some("a.sc"));
        assert_eq!(display_name(None, &entry_q), Some("Q"));
    }
}
