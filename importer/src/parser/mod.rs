//! Streaming CSV reader for customer files.
//!
//! [`RowReader`] yields one [`RawRow`] at a time and never buffers the
//! whole file. The first physical line is always discarded as the header,
//! without being parsed or inspected.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{ParseError, ParseResult};
use crate::models::RawRow;

/// Lazy, one-pass iterator over the data rows of a CSV source.
///
/// Comma delimited, double-quote quoting, doubled-quote escaping. Rows may
/// have any number of fields; see [`RawRow::new`] for padding. Invalid
/// UTF-8 is decoded lossily so that bad bytes end up as field content and
/// fail validation instead of aborting the stream.
pub struct RowReader<R: Read> {
    state: State<R>,
    record: csv::ByteRecord,
    /// Lines consumed before the CSV reader took over.
    skipped_lines: u64,
}

enum State<R: Read> {
    /// Header line not consumed yet.
    Header(BufReader<R>),
    Rows(csv::Reader<BufReader<R>>),
    Done,
}

impl<R: Read> RowReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            state: State::Header(BufReader::new(reader)),
            record: csv::ByteRecord::new(),
            skipped_lines: 0,
        }
    }

    /// Drop the first line and hand the rest of the stream to `csv`.
    fn skip_header(&mut self, mut source: BufReader<R>) -> ParseResult<()> {
        let mut header = Vec::new();
        source.read_until(b'\n', &mut header)?;
        self.skipped_lines = header.ends_with(b"\n") as u64;

        let inner = csv::ReaderBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .double_quote(true)
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        self.state = State::Rows(inner);
        Ok(())
    }
}

impl RowReader<File> {
    /// Open a file for streaming.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = ParseResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Header(_)) {
            if let State::Header(source) = std::mem::replace(&mut self.state, State::Done) {
                if let Err(e) = self.skip_header(source) {
                    return Some(Err(e));
                }
            }
        }

        let State::Rows(inner) = &mut self.state else {
            return None;
        };

        match inner.read_byte_record(&mut self.record) {
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                let fields = self
                    .record
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned());
                Some(Ok(RawRow::new(fields, line + self.skipped_lines)))
            }
            Ok(false) => {
                self.state = State::Done;
                None
            }
            Err(e) => {
                // The reader cannot resume after an I/O failure.
                self.state = State::Done;
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Some(Err(ParseError::Read {
                    line: line + self.skipped_lines,
                    message: e.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows(csv: &str) -> Vec<RawRow> {
        RowReader::new(csv.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_header_is_skipped() {
        let rows = rows("id,name,email,age,location\n1,John Smith,john@example.com,30,France\n");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), "1");
        assert_eq!(rows[0].name(), "John Smith");
        assert_eq!(rows[0].location(), "France");
    }

    #[test]
    fn test_header_only_yields_nothing() {
        assert!(rows("id,name,email,age,location\n").is_empty());
        assert!(rows("").is_empty());
    }

    #[test]
    fn test_header_not_validated() {
        let rows = rows("whatever;goes;here\n1,Ann Lee,ann@example.com,20,Peru");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].age(), "20");
    }

    #[test]
    fn test_quoted_values() {
        let csv = "id,name,email,age,location\n\
                   2,\"Lee, Bob\",bob@example.com,40,\"Korea, Republic of\"\n\
                   3,\"Jo \"\"JJ\"\" Doe\",jo@example.com,25,Spain\n";
        let rows = rows(csv);

        assert_eq!(rows[0].name(), "Lee, Bob");
        assert_eq!(rows[0].location(), "Korea, Republic of");
        assert_eq!(rows[1].name(), "Jo \"JJ\" Doe");
    }

    #[test]
    fn test_trailing_and_blank_lines_skipped() {
        let rows = rows("h\n1,A B,a@b.io,20,X\n\n2,C D,c@d.io,30,Y\n\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id(), "2");
    }

    #[test]
    fn test_crlf_line_endings() {
        let rows = rows("h\r\n1,A B,a@b.io,20,Chile\r\n");
        assert_eq!(rows[0].location(), "Chile");
    }

    #[test]
    fn test_short_and_long_rows() {
        let rows = rows("h\n1,Only Name\n2,A B,a@b.io,20,Peru,surplus\n");

        assert_eq!(rows[0].email(), "");
        assert_eq!(rows[0].location(), "");
        assert_eq!(rows[1].location(), "Peru");
    }

    #[test]
    fn test_line_numbers_follow_source() {
        let csv = "h\n1,\"Multi\nLine\",m@x.io,20,Peru\n2,A B,a@b.io,20,Chile\n";
        let rows = rows(csv);

        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].name(), "Multi\nLine");
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_unbalanced_quote_is_not_an_error() {
        let rows = rows("h\n1,\"Broken,b@x.io,20,Peru\n");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].email().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut bytes = b"h\n1,".to_vec();
        bytes.extend_from_slice(&[0x53, 0x6F, 0x63, 0x69, 0xE9]);
        bytes.extend_from_slice(b" Doe,x@y.io,20,France\n");

        let rows: Vec<_> = RowReader::new(bytes.as_slice())
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(rows[0].name().starts_with("Soci"));
        assert!(rows[0].name().ends_with(" Doe"));
    }

    #[test]
    fn test_blank_first_line_is_the_header() {
        let csv = "\n1,John Smith,john@example.com,30,France\n2,Ann Lee,ann@example.com,20,Spain\n";
        let rows = rows(csv);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), "1");
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].id(), "2");
    }

    #[test]
    fn test_quote_in_header_does_not_swallow_rows() {
        let csv = "id,\"name,email,age,location\n\
                   1,John Smith,john@example.com,30,France\n\
                   2,Ann Lee,ann@example.com,20,Spain\n";
        let rows = rows(csv);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name(), "John Smith");
        assert_eq!(rows[1].location(), "Spain");
    }

    #[test]
    fn test_header_without_newline() {
        assert!(rows("id,name,email,age,location").is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,email,age,location").unwrap();
        writeln!(file, "1,John Smith,john@example.com,30,France").unwrap();

        let rows: Vec<_> = RowReader::from_path(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = RowReader::from_path("/definitely/not/here.csv");
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
