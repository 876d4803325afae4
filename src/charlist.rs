//! Charlist compilation.
//!
//! A charlist is plain text split into sections by blank lines. The first
//! line of a section names the segment; every other line is one entry of the
//! form `HEXCODE[.feat1[.feat2...]]`:
//!
//! ```text
//! Basic Latin
//! 51
//! 61.sc
//!
//! Cyrillic
//! 410
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;
use crate::types::{CharEntry, CompiledCharMap};

pub const DEFAULT_CHARLIST_PATH: &str = "data/charlist.txt";
pub const DEFAULT_CHARMAP_PATH: &str = "data/charmap.json";

/// Parse charlist source into a segment map.
///
/// Only truly empty lines separate sections. A line holding nothing but
/// whitespace is an empty entry and is skipped without ending the section.
///
/// Fails on the first entry whose code point is not hexadecimal or not a
/// Unicode scalar value; nothing is returned for the rest of the source.
pub fn compile(source: &str) -> Result<CompiledCharMap, Error> {
    let mut map = CompiledCharMap::new();
    let mut section: Option<(String, Vec<CharEntry>)> = None;

    for (idx, raw) in source.lines().enumerate() {
        if raw.trim_end_matches('\r').is_empty() {
            if let Some((name, entries)) = section.take() {
                map.insert(name, entries);
            }
            continue;
        }
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match section.as_mut() {
            None => section = Some((line.to_string(), Vec::new())),
            Some((_, entries)) => entries.push(parse_entry(line, idx + 1)?),
        }
    }
    if let Some((name, entries)) = section {
        map.insert(name, entries);
    }

    debug!(
        "compiled {} segments, {} entries",
        map.len(),
        map.sections().iter().map(|s| s.entries.len()).sum::<usize>()
    );
    Ok(map)
}

fn parse_entry(line: &str, line_number: usize) -> Result<CharEntry, Error> {
    let mut fields = line.split('.');
    let hex = fields.next().unwrap_or_default().trim();

    let code = u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidCodePoint {
        line_number,
        line: line.to_string(),
    })?;
    if char::from_u32(code).is_none() {
        return Err(Error::InvalidScalar {
            line_number,
            line: line.to_string(),
            code,
        });
    }

    let features: Vec<String> = fields.map(|f| f.trim().to_string()).collect();
    Ok(CharEntry {
        code,
        features: if features.is_empty() {
            None
        } else {
            Some(features)
        },
    })
}

/// Builder for configuring a charlist compile run.
///
/// # Examples
///
/// ```no_run
/// use glyph_specimen::Compiler;
///
/// let map = Compiler::builder()
///     .input("fonts/charlist.txt")
///     .output("web/charmap.json")
///     .pretty(false)
///     .build()
///     .run()?;
/// # Ok::<(), glyph_specimen::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompilerBuilder {
    input: PathBuf,
    output: PathBuf,
    pretty: bool,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        CompilerBuilder {
            input: PathBuf::from(DEFAULT_CHARLIST_PATH),
            output: PathBuf::from(DEFAULT_CHARMAP_PATH),
            pretty: true,
        }
    }
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the charlist source file.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = path.into();
        self
    }

    /// Set where the compiled artifact is written.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Indent the artifact (the default) or write it on a single line.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            input: self.input,
            output: self.output,
            pretty: self.pretty,
        }
    }
}

/// Reads a charlist file and writes its compiled artifact.
#[derive(Debug, Clone)]
pub struct Compiler {
    input: PathBuf,
    output: PathBuf,
    pretty: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        CompilerBuilder::default().build()
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Compile the input file and write the artifact.
    ///
    /// The whole source is parsed before anything is written, so a parse
    /// error leaves any existing artifact untouched.
    pub fn run(&self) -> Result<CompiledCharMap, Error> {
        let source = fs::read_to_string(&self.input)?;
        let map = compile(&source)?;
        map.write_artifact(&self.output, self.pretty)?;
        Ok(map)
    }
}
