//! @ai:module:intent Stream comma-separated fields to a sink, failing with layered errors
//! @ai:module:layer application
//! @ai:module:public_api parse, parse_file, parse_reader, FieldSink, ParseSummary
//! @ai:module:depends_on layers, result, source, config
//! @ai:module:stateless true
//!
//! Three nested scopes, each with its own `Result`:
//! the file scope opens the source and loops over records, the record scope
//! loops over fields, and the field scope reads bytes. Only the field scope
//! creates errors; the record scope forwards them with `?`, and the file
//! scope wraps them into [`FileParseError::RecordFailed`].

use crate::config::{OverflowPolicy, ParserConfig};
use crate::layers::{FieldErrorKind, FieldReadError, FileParseError, IoFailure};
use crate::result::ResultExt;
use crate::source::{FileSource, Source};
use serde::Serialize;
use std::io::{BufReader, Bytes, Read};
use std::path::{Path, PathBuf};

/// @ai:intent Receives every field as soon as it is complete
pub trait FieldSink {
    /// `row` and `column` are zero-based.
    fn field(&mut self, row: usize, column: usize, value: &str);
}

impl<F> FieldSink for F
where
    F: FnMut(usize, usize, &str),
{
    fn field(&mut self, row: usize, column: usize, value: &str) {
        self(row, column, value)
    }
}

/// @ai:intent Counts reported after a successful parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub records: usize,
    pub fields: usize,
}

/// @ai:intent Parse a file on disk with the default configuration
/// @ai:effects fs:read
pub fn parse_file<K: FieldSink>(
    path: impl Into<PathBuf>,
    sink: K,
) -> Result<ParseSummary, FileParseError> {
    parse(&FileSource::new(path), &ParserConfig::default(), sink)
}

/// @ai:intent Open a source and stream its fields to the sink
/// @ai:post on CannotOpen the sink was never called
/// @ai:post the opened reader is dropped exactly once on every path
/// @ai:effects fs:read
pub fn parse<S, K>(
    source: &S,
    config: &ParserConfig,
    sink: K,
) -> Result<ParseSummary, FileParseError>
where
    S: Source,
    K: FieldSink,
{
    let path = source.path();
    let reader = source
        .open()
        .map_err(|e| FileParseError::cannot_open(e, path))?;
    tracing::info!("Opened {}", path.display());

    let summary = parse_reader(reader, path, config, sink).within::<FileParseError>(())?;

    tracing::info!(
        "Parsed {} records, {} fields from {}",
        summary.records,
        summary.fields,
        path.display()
    );
    Ok(summary)
}

/// @ai:intent Run the record and field scopes over an already opened reader
/// @ai:post `reader` is consumed and dropped before returning
pub fn parse_reader<R, K>(
    reader: R,
    path: &Path,
    config: &ParserConfig,
    sink: K,
) -> Result<ParseSummary, FieldReadError>
where
    R: Read,
    K: FieldSink,
{
    let mut scanner = Scanner {
        bytes: BufReader::new(reader).bytes(),
        path,
        config,
        sink,
        fields: 0,
    };

    let mut row = 0;
    loop {
        match scanner.record(row)? {
            RecordEnd::Terminated => row += 1,
            RecordEnd::EndOfInput { empty } => {
                if !empty {
                    row += 1;
                }
                break;
            }
        }
    }

    Ok(ParseSummary {
        records: row,
        fields: scanner.fields,
    })
}

enum FieldEnd {
    Separator,
    Terminator,
    /// `empty` is true when the record ended before any byte was read.
    EndOfInput { empty: bool },
}

enum RecordEnd {
    Terminated,
    EndOfInput { empty: bool },
}

struct Scanner<'a, R, K> {
    bytes: Bytes<BufReader<R>>,
    path: &'a Path,
    config: &'a ParserConfig,
    sink: K,
    fields: usize,
}

impl<R: Read, K: FieldSink> Scanner<'_, R, K> {
    /// @ai:intent Read fields until the record terminator or end of input
    fn record(&mut self, row: usize) -> Result<RecordEnd, FieldReadError> {
        let mut column = 0;
        loop {
            match self.field(row, column)? {
                FieldEnd::Separator => column += 1,
                FieldEnd::Terminator => {
                    tracing::debug!("Record #{} has {} fields", row, column + 1);
                    return Ok(RecordEnd::Terminated);
                }
                FieldEnd::EndOfInput { empty } => return Ok(RecordEnd::EndOfInput { empty }),
            }
        }
    }

    /// @ai:intent Accumulate one field, emitting it when a delimiter is reached
    fn field(&mut self, row: usize, column: usize) -> Result<FieldEnd, FieldReadError> {
        let path = self.path;
        let separator = self.config.separator.as_byte();
        let mut value = Vec::new();
        let mut consumed = false;
        let mut truncated = false;

        loop {
            let byte = match self.bytes.next() {
                Some(read) => read
                    .within_with::<IoFailure, _>(|| path.to_path_buf())
                    .within::<FieldReadError>(row)?,
                None => {
                    // an unterminated record still yields its last field
                    let empty = column == 0 && !consumed;
                    if !empty {
                        self.emit(row, column, &value, truncated);
                    }
                    return Ok(FieldEnd::EndOfInput { empty });
                }
            };
            consumed = true;

            match byte {
                b if b == separator => {
                    self.emit(row, column, &value, truncated);
                    return Ok(FieldEnd::Separator);
                }
                b'\n' => {
                    self.emit(row, column, &value, truncated);
                    return Ok(FieldEnd::Terminator);
                }
                b' ' | b'\t' | b'\r' => {}
                b => match self.config.max_value_len {
                    Some(limit) if value.len() >= limit.get() => match self.config.overflow {
                        OverflowPolicy::Truncate => truncated = true,
                        OverflowPolicy::Error => {
                            return Err(FieldReadError {
                                row,
                                kind: FieldErrorKind::ValueTooLong {
                                    column,
                                    limit: limit.get(),
                                },
                            })
                        }
                    },
                    _ => value.push(b),
                },
            }
        }
    }

    fn emit(&mut self, row: usize, column: usize, value: &[u8], truncated: bool) {
        if truncated {
            tracing::warn!(
                "Value at [{}][{}] truncated to {} bytes",
                row,
                column,
                value.len()
            );
        }
        let text = String::from_utf8_lossy(value);
        self.sink.field(row, column, &text);
        self.fields += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Separator;
    use crate::layers::{FieldErrorTag, FileParseTag};
    use crate::tagged::Tagged;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::{self, Cursor, Write};
    use std::num::NonZeroUsize;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    type Row = (usize, usize, String);

    fn collect(input: &str) -> (Vec<Row>, ParseSummary) {
        collect_with(input, &ParserConfig::default())
    }

    fn collect_with(input: &str, config: &ParserConfig) -> (Vec<Row>, ParseSummary) {
        let mut rows = Vec::new();
        let summary = parse_reader(
            Cursor::new(input.as_bytes()),
            Path::new("mem.csv"),
            config,
            |i: usize, j: usize, v: &str| rows.push((i, j, v.to_string())),
        )
        .unwrap();
        (rows, summary)
    }

    fn row(i: usize, j: usize, v: &str) -> Row {
        (i, j, v.to_string())
    }

    /// Delivers `data[..fail_at]`, then fails every read.
    struct FailingReader {
        data: Vec<u8>,
        pos: usize,
        fail_at: Option<usize>,
        drops: Rc<Cell<usize>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = self.fail_at.unwrap_or(self.data.len()).min(self.data.len());
            if self.pos >= end {
                if self.fail_at.is_some() {
                    return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
                }
                return Ok(0);
            }
            let n = buf.len().min(end - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Drop for FailingReader {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    struct MockSource {
        data: &'static str,
        fail_at: Option<usize>,
        open_error: Option<io::ErrorKind>,
        opens: Cell<usize>,
        drops: Rc<Cell<usize>>,
    }

    impl MockSource {
        fn new(data: &'static str) -> Self {
            Self {
                data,
                fail_at: None,
                open_error: None,
                opens: Cell::new(0),
                drops: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Source for MockSource {
        type Reader = FailingReader;

        fn path(&self) -> &Path {
            Path::new("mock.csv")
        }

        fn open(&self) -> io::Result<FailingReader> {
            self.opens.set(self.opens.get() + 1);
            if let Some(kind) = self.open_error {
                return Err(io::Error::new(kind, "cannot open"));
            }
            Ok(FailingReader {
                data: self.data.as_bytes().to_vec(),
                pos: 0,
                fail_at: self.fail_at,
                drops: Rc::clone(&self.drops),
            })
        }
    }

    #[test]
    fn test_happy_path() {
        let (rows, summary) = collect("a,b\nc,d\n");

        assert_eq!(
            rows,
            vec![row(0, 0, "a"), row(0, 1, "b"), row(1, 0, "c"), row(1, 1, "d")]
        );
        assert_eq!(
            summary,
            ParseSummary {
                records: 2,
                fields: 4
            }
        );
    }

    #[test]
    fn test_missing_final_terminator_still_emits_last_field() {
        let (rows, summary) = collect("a,b\nc,d");

        assert_eq!(
            rows,
            vec![row(0, 0, "a"), row(0, 1, "b"), row(1, 0, "c"), row(1, 1, "d")]
        );
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn test_empty_input_is_ok() {
        let (rows, summary) = collect("");
        assert!(rows.is_empty());
        assert_eq!(summary, ParseSummary::default());
    }

    #[test]
    fn test_empty_line_is_single_empty_field() {
        let (rows, _) = collect("a\n\nb\n");
        assert_eq!(rows, vec![row(0, 0, "a"), row(1, 0, ""), row(2, 0, "b")]);
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let (rows, _) = collect("  x  , \n\tin ner\r\n");
        assert_eq!(rows, vec![row(0, 0, "x"), row(0, 1, ""), row(1, 0, "inner")]);
    }

    #[test]
    fn test_trailing_separator_emits_empty_field() {
        let (rows, _) = collect("a,\n");
        assert_eq!(rows, vec![row(0, 0, "a"), row(0, 1, "")]);
    }

    #[test]
    fn test_custom_separator() {
        let config = ParserConfig {
            separator: Separator::new(';').unwrap(),
            ..Default::default()
        };
        let (rows, _) = collect_with("a;b,c\n", &config);
        assert_eq!(rows, vec![row(0, 0, "a"), row(0, 1, "b,c")]);
    }

    #[test]
    fn test_multibyte_separator_is_rejected_before_parsing() {
        let err = Separator::new('é').unwrap_err();
        assert!(err.to_string().contains("not a single-byte character"));

        // the scanner only ever sees separators that survived validation
        let (rows, _) = collect("aéb,c\n");
        assert_eq!(rows, vec![row(0, 0, "aéb"), row(0, 1, "c")]);
    }

    #[test]
    fn test_long_values_grow_without_limit() {
        let long = "x".repeat(100);
        let (rows, _) = collect(&format!("{long}\n"));
        assert_eq!(rows, vec![row(0, 0, &long)]);
    }

    #[test]
    fn test_limit_truncates_by_default() {
        let config = ParserConfig {
            max_value_len: NonZeroUsize::new(3),
            ..Default::default()
        };
        let (rows, _) = collect_with("abcdef,gh\n", &config);
        assert_eq!(rows, vec![row(0, 0, "abc"), row(0, 1, "gh")]);
    }

    #[test]
    fn test_limit_can_raise_value_too_long() {
        let config = ParserConfig {
            max_value_len: NonZeroUsize::new(3),
            overflow: OverflowPolicy::Error,
            ..Default::default()
        };
        let mut calls = 0;
        let err = parse_reader(
            Cursor::new("ok\nx,abcd\n".as_bytes()),
            Path::new("mem.csv"),
            &config,
            |_: usize, _: usize, _: &str| calls += 1,
        )
        .unwrap_err();

        assert_eq!(err.row, 1);
        assert_eq!(err.kind.tag(), FieldErrorTag::ValueTooLong);
        assert!(matches!(
            err.kind,
            FieldErrorKind::ValueTooLong {
                column: 1,
                limit: 3
            }
        ));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_non_utf8_bytes_are_replaced() {
        let mut rows = Vec::new();
        parse_reader(
            Cursor::new(&b"a\xffb\n"[..]),
            Path::new("mem.csv"),
            &ParserConfig::default(),
            |i: usize, j: usize, v: &str| rows.push((i, j, v.to_string())),
        )
        .unwrap();
        assert_eq!(rows, vec![row(0, 0, "a\u{fffd}b")]);
    }

    #[test]
    fn test_read_failure_carries_row_of_second_record() {
        let mut source = MockSource::new("a,b\nc,d");
        source.fail_at = Some(5);
        let mut rows = Vec::new();

        let err = parse(&source, &ParserConfig::default(), |i: usize, j: usize, v: &str| {
            rows.push((i, j, v.to_string()))
        })
        .unwrap_err();

        assert_eq!(err.tag(), FileParseTag::RecordFailed);
        match &err {
            FileParseError::RecordFailed(inner) => {
                assert_eq!(inner.row, 1);
                match &inner.kind {
                    FieldErrorKind::Read(io) => {
                        assert_eq!(io.path, Path::new("mock.csv"));
                        assert_eq!(io.source.to_string(), "device unplugged");
                    }
                    FieldErrorKind::ValueTooLong { .. } => panic!("wrong kind"),
                }
            }
            FileParseError::CannotOpen { .. } => panic!("wrong variant"),
        }
        assert_eq!(err.to_string(), "Cannot parse record #1");
        assert_eq!(rows, vec![row(0, 0, "a"), row(0, 1, "b")]);
    }

    #[test]
    fn test_open_failure_never_calls_sink() {
        let mut source = MockSource::new("a,b\n");
        source.open_error = Some(io::ErrorKind::NotFound);
        let mut calls = 0;

        let err = parse(&source, &ParserConfig::default(), |_: usize, _: usize, _: &str| {
            calls += 1
        })
        .unwrap_err();

        assert!(err.is(FileParseTag::CannotOpen));
        assert_eq!(err.to_string(), "Cannot open file mock.csv");
        assert_eq!(calls, 0);
        assert_eq!(source.opens.get(), 1);
        assert_eq!(source.drops.get(), 0);
    }

    #[test]
    fn test_reader_released_once_on_success() {
        let source = MockSource::new("a,b\nc,d\n");

        parse(&source, &ParserConfig::default(), |_: usize, _: usize, _: &str| {}).unwrap();

        assert_eq!(source.opens.get(), 1);
        assert_eq!(source.drops.get(), 1);
    }

    #[test]
    fn test_reader_released_once_on_read_failure() {
        let mut source = MockSource::new("a,b\nc,d\n");
        source.fail_at = Some(2);

        let result = parse(&source, &ParserConfig::default(), |_: usize, _: usize, _: &str| {});

        assert!(result.is_err());
        assert_eq!(source.drops.get(), 1);
    }

    #[test]
    fn test_reader_released_once_when_sink_panics() {
        let source = MockSource::new("a,b\n");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            parse(&source, &ParserConfig::default(), |_: usize, _: usize, _: &str| {
                panic!("sink failed")
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(source.drops.get(), 1);
    }

    #[test]
    fn test_parse_file_from_disk() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "a,b\nc,d\n").unwrap();
        let mut rows = Vec::new();

        let summary = parse_file(file.path(), |i: usize, j: usize, v: &str| {
            rows.push((i, j, v.to_string()))
        })
        .unwrap();

        assert_eq!(summary.fields, 4);
        assert_eq!(
            rows,
            vec![row(0, 0, "a"), row(0, 1, "b"), row(1, 0, "c"), row(1, 1, "d")]
        );
    }

    #[test]
    fn test_parse_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let mut calls = 0;

        let err = parse_file(&path, |_: usize, _: usize, _: &str| calls += 1).unwrap_err();

        match err {
            FileParseError::CannotOpen { path: p, status, .. } => {
                assert_eq!(p, path);
                assert!(status > 0);
            }
            FileParseError::RecordFailed(_) => panic!("wrong variant"),
        }
        assert_eq!(calls, 0);
    }
}
