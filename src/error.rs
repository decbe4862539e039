//! Error types for reading atlas manifests

use std::io;
use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in manifest text
pub type Span = std::ops::Range<usize>;

/// Fatal manifest errors. Either one aborts the batch before any output is touched.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest not found at '{}': {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed manifest '{}': {message}", path.display())]
    Malformed {
        path: PathBuf,
        message: String,
        span: Span,
        /// Manifest text, kept so the error can be reported in context
        text: String,
    },
}

impl ManifestError {
    /// Format the error, with the offending manifest line shown for malformed input
    pub fn report(&self) -> String {
        match self {
            ManifestError::NotFound { .. } => self.to_string(),
            ManifestError::Malformed {
                path,
                message,
                span,
                text,
            } => {
                let filename = path.display().to_string();
                let filename = filename.as_str();
                let mut buf = Vec::new();

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message("malformed atlas manifest")
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(text.as_str())), &mut buf);

                match written {
                    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
                    Err(_) => self.to_string(),
                }
            }
        }
    }
}

/// Convert a 1-based row/column position into a byte span in `text`
///
/// The span covers the character at that position, or is empty at end of input.
pub(crate) fn span_at(text: &str, row: u32, col: u32) -> Span {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(row.saturating_sub(1) as usize)
        .map(str::len)
        .sum();
    let line = &text[line_start..];

    match line.char_indices().nth(col.saturating_sub(1) as usize) {
        Some((offset, c)) => {
            let start = line_start + offset;
            start..start + c.len_utf8()
        }
        None => text.len()..text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_at_first_line() {
        assert_eq!(span_at("<a>", 1, 1), 0..1);
        assert_eq!(span_at("<a>", 1, 3), 2..3);
    }

    #[test]
    fn test_span_at_later_line() {
        let text = "<a>\n  <b>\n</a>";
        assert_eq!(span_at(text, 2, 3), 6..7);
    }

    #[test]
    fn test_span_at_end_of_input() {
        assert_eq!(span_at("<a>", 1, 10), 3..3);
        assert_eq!(span_at("", 1, 1), 0..0);
    }

    #[test]
    fn test_report_mentions_message() {
        let err = ManifestError::Malformed {
            path: PathBuf::from("sheet.xml"),
            message: "unexpected end of stream".to_string(),
            span: 0..1,
            text: "<".to_string(),
        };
        let report = err.report();
        assert!(report.contains("malformed atlas manifest"));
        assert!(report.contains("unexpected end of stream"));
    }

    #[test]
    fn test_report_not_found_is_display() {
        let err = ManifestError::NotFound {
            path: PathBuf::from("missing.xml"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(err.report(), err.to_string());
        assert!(err.to_string().contains("missing.xml"));
    }
}
