//! Coordinate stream text format.
//!
//! One nonzero entry per line, whitespace-separated. The first `dim` tokens
//! are integer coordinates; anything after them (usually the tensor value)
//! is ignored.
//!
//! ```text
//! % 300 300 200        <- optional header: per-axis widths
//! 0 12 7 4.5
//! 151 3 199 0.25
//! # comment
//! ```
//!
//! Lines starting with `%` or `#` are comments, except that the first `%`
//! line before any record whose tokens are all non-negative integers is read
//! as the header. Blank lines are skipped.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::config::IndexBase;
use crate::error::{AnalysisError, ParseError, ParseErrorKind};

// =============================================================================
// TensorHeader
// =============================================================================

/// Per-axis widths declared by a `%` header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorHeader {
    pub widths: Vec<u64>,
}

impl TensorHeader {
    fn parse(body: &str) -> Option<Self> {
        let widths: Vec<u64> = body
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        (!widths.is_empty()).then_some(Self { widths })
    }
}

// =============================================================================
// Line parsing
// =============================================================================

/// Classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank or comment line.
    Skip,
    /// A `%` line that could be a header.
    Header(TensorHeader),
    /// A record; coordinates were written into the output buffer.
    Record,
}

/// Parses single lines of the coordinate format.
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    dim: usize,
    index_base: IndexBase,
}

impl RecordParser {
    pub fn new(dim: usize, index_base: IndexBase) -> Self {
        Self { dim, index_base }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Parse `text` (line number `line`), writing coordinates into `out`.
    ///
    /// `out` is cleared first and holds exactly `dim` values when
    /// [`Line::Record`] is returned.
    pub fn parse_line(&self, line: usize, text: &str, out: &mut Vec<i64>) -> Result<Line, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Line::Skip);
        }
        if let Some(body) = trimmed.strip_prefix('%') {
            return Ok(TensorHeader::parse(body).map_or(Line::Skip, Line::Header));
        }

        out.clear();
        let mut tokens = trimmed.split_whitespace();
        for axis in 0..self.dim {
            let token = tokens.next().ok_or_else(|| {
                ParseError::new(
                    line,
                    ParseErrorKind::TooFewTokens {
                        expected: self.dim,
                        found: axis,
                    },
                )
            })?;
            let value: i64 = token.parse().map_err(|_| {
                ParseError::new(
                    line,
                    ParseErrorKind::InvalidInteger {
                        axis,
                        token: token.to_string(),
                    },
                )
            })?;
            out.push(self.rebase(line, axis, value)?);
        }
        Ok(Line::Record)
    }

    #[inline]
    fn rebase(&self, line: usize, axis: usize, value: i64) -> Result<i64, ParseError> {
        match self.index_base {
            IndexBase::Zero => Ok(value),
            IndexBase::One if value >= 1 => Ok(value - 1),
            IndexBase::One => Err(ParseError::new(
                line,
                ParseErrorKind::NotOneBased { axis, value },
            )),
        }
    }
}

// =============================================================================
// CoordinateReader
// =============================================================================

/// Iterator over the records of a buffered coordinate stream.
///
/// Yields one `Vec<i64>` of length `dim` per record line. Parse errors are
/// yielded in place of the offending record; iteration may continue past
/// them. A line that is not valid UTF-8 is a parse error like any other.
/// I/O errors end iteration.
pub struct CoordinateReader<R> {
    reader: R,
    buf: Vec<u8>,
    parser: RecordParser,
    line_no: usize,
    seen_record: bool,
    header: Option<TensorHeader>,
    done: bool,
}

impl<R: BufRead> CoordinateReader<R> {
    pub fn new(reader: R, parser: RecordParser) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            parser,
            line_no: 0,
            seen_record: false,
            header: None,
            done: false,
        }
    }

    /// Header seen so far, if any.
    pub fn header(&self) -> Option<&TensorHeader> {
        self.header.as_ref()
    }

    pub fn into_header(self) -> Option<TensorHeader> {
        self.header
    }

    /// Number of physical lines consumed.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for CoordinateReader<R> {
    type Item = Result<Vec<i64>, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut coords = Vec::with_capacity(self.parser.dim());
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
            self.line_no += 1;

            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(_) => {
                    self.seen_record = true;
                    return Some(Err(ParseError::new(self.line_no, ParseErrorKind::InvalidUtf8).into()));
                }
            };

            match self.parser.parse_line(self.line_no, text, &mut coords) {
                Ok(Line::Skip) => {}
                Ok(Line::Header(header)) => {
                    if self.seen_record || self.header.is_some() {
                        continue;
                    }
                    if header.widths.len() != self.parser.dim() {
                        self.done = true;
                        return Some(Err(ParseError::new(
                            self.line_no,
                            ParseErrorKind::HeaderMismatch {
                                expected: self.parser.dim(),
                                found: header.widths.len(),
                            },
                        )
                        .into()));
                    }
                    self.header = Some(header);
                }
                Ok(Line::Record) => {
                    self.seen_record = true;
                    return Some(Ok(coords));
                }
                Err(e) => {
                    self.seen_record = true;
                    return Some(Err(e.into()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: &RecordParser, text: &str) -> Result<(Line, Vec<i64>), ParseError> {
        let mut out = Vec::new();
        let line = parser.parse_line(1, text, &mut out)?;
        Ok((line, out))
    }

    #[test]
    fn trailing_value_is_ignored() {
        let parser = RecordParser::new(3, IndexBase::Zero);
        let (line, coords) = parse(&parser, "100 100 50 2.0").unwrap();
        assert_eq!(line, Line::Record);
        assert_eq!(coords, vec![100, 100, 50]);

        let (_, coords) = parse(&parser, "  1\t2   3  ").unwrap();
        assert_eq!(coords, vec![1, 2, 3]);
    }

    #[test]
    fn too_few_tokens() {
        let parser = RecordParser::new(3, IndexBase::Zero);
        let err = parse(&parser, "1 2").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::TooFewTokens {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn non_integer_coordinate() {
        let parser = RecordParser::new(3, IndexBase::Zero);
        let err = parse(&parser, "1 2.5 3 1.0").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidInteger {
                axis: 1,
                token: "2.5".into()
            }
        );
    }

    #[test]
    fn one_based_coordinates_are_shifted() {
        let parser = RecordParser::new(2, IndexBase::One);
        let (_, coords) = parse(&parser, "1 5").unwrap();
        assert_eq!(coords, vec![0, 4]);

        let err = parse(&parser, "1 0").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotOneBased { axis: 1, value: 0 });
    }

    #[test]
    fn comments_and_headers() {
        let parser = RecordParser::new(3, IndexBase::Zero);
        assert_eq!(parse(&parser, "").unwrap().0, Line::Skip);
        assert_eq!(parse(&parser, "# note").unwrap().0, Line::Skip);
        assert_eq!(parse(&parser, "% generated by hand").unwrap().0, Line::Skip);
        assert_eq!(
            parse(&parser, "% 10 20 30 ").unwrap().0,
            Line::Header(TensorHeader {
                widths: vec![10, 20, 30]
            })
        );
    }

    #[test]
    fn reader_tracks_header_and_line_numbers() {
        let text = "% 4 4 4\n0 1 2 1.0\n\n3 3 3 2.0\n% 9 9\n";
        let mut reader = CoordinateReader::new(text.as_bytes(), RecordParser::new(3, IndexBase::Zero));

        assert_eq!(reader.next().unwrap().unwrap(), vec![0, 1, 2]);
        assert_eq!(reader.header().unwrap().widths, vec![4, 4, 4]);
        assert_eq!(reader.next().unwrap().unwrap(), vec![3, 3, 3]);
        assert!(reader.next().is_none());
        assert_eq!(reader.lines_read(), 5);
    }

    #[test]
    fn reader_rejects_header_of_wrong_arity() {
        let text = "% 4 4\n0 1 2\n";
        let mut reader = CoordinateReader::new(text.as_bytes(), RecordParser::new(3, IndexBase::Zero));
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Parse(ParseError {
                line: 1,
                kind: ParseErrorKind::HeaderMismatch { expected: 3, found: 2 }
            })
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn reader_reports_invalid_utf8_with_line_number() {
        let text: &[u8] = b"0 0 0\n1 1 \xff 2.0\r\n2 2 2\r\n";
        let mut reader = CoordinateReader::new(text, RecordParser::new(3, IndexBase::Zero));

        assert_eq!(reader.next().unwrap().unwrap(), vec![0, 0, 0]);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Parse(ParseError {
                line: 2,
                kind: ParseErrorKind::InvalidUtf8
            })
        ));
        assert_eq!(reader.next().unwrap().unwrap(), vec![2, 2, 2]);
        assert!(reader.next().is_none());
        assert_eq!(reader.lines_read(), 3);
    }

    #[test]
    fn reader_continues_after_parse_error() {
        let text = "0 0\nbad line\n1 1\n";
        let reader = CoordinateReader::new(text.as_bytes(), RecordParser::new(2, IndexBase::Zero));
        let results: Vec<_> = reader.collect();
        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), &vec![1, 1]);
    }
}
