use std::fmt::Formatter;

#[derive(Debug)]
pub enum Error {
    /// The first field of a charlist entry is not a hexadecimal number.
    InvalidCodePoint { line_number: usize, line: String },
    /// The code point parsed but is not a Unicode scalar value.
    InvalidScalar {
        line_number: usize,
        line: String,
        code: u32,
    },
    /// A name database line has no parseable code point.
    InvalidNameRecord { line_number: usize, line: String },
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    FontError(ttf_parser::FaceParsingError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::InvalidCodePoint { line_number, line } => {
                write!(f, "Invalid code point in entry on line {}: {}", line_number, line)
            }
            Error::InvalidScalar {
                line_number,
                line,
                code,
            } => write!(
                f,
                "Code point 0x{:04X} on line {} is not a Unicode scalar value: {}",
                code, line_number, line
            ),
            Error::InvalidNameRecord { line_number, line } => {
                write!(f, "Invalid name record on line {}: {}", line_number, line)
            }
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::FontError(e) => write!(f, "Font error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::JsonError(e) => Some(e),
            Error::FontError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e)
    }
}

impl From<ttf_parser::FaceParsingError> for Error {
    fn from(e: ttf_parser::FaceParsingError) -> Self {
        Error::FontError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_name_the_line() {
        let e = Error::InvalidCodePoint {
            line_number: 3,
            line: "GG.sc".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid code point in entry on line 3: GG.sc");

        let e = Error::InvalidScalar {
            line_number: 7,
            line: "D800".to_string(),
            code: 0xD800,
        };
        assert!(e.to_string().contains("0xD800"));
        assert!(e.to_string().contains("D800"));
    }
}
