use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use memchr::memchr2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::warn;

/// Bulk-insert statements start with this prefix; everything else in the dump
/// (DDL, locks, comments) is skipped.
const INSERT_PREFIX: &[u8] = b"INSERT INTO";

/// A single field of a dump tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl SqlValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Streams tuple rows out of a SQL dump, one `INSERT INTO ... VALUES` line at
/// a time. Tuples are tokenized with an explicit scanner rather than a regex:
/// titles containing quotes, parentheses, or field separators only split on
/// real delimiters, never inside a string literal.
///
/// Invalid UTF-8 is replaced rather than aborting the scan; malformed tuples
/// are dropped and counted.
pub struct DumpScanner<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    pending: std::vec::IntoIter<Vec<SqlValue>>,
    skipped_tuples: u64,
}

impl<R: BufRead> std::fmt::Debug for DumpScanner<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpScanner")
            .field("line_len", &self.line.len())
            .field("skipped_tuples", &self.skipped_tuples)
            .finish_non_exhaustive()
    }
}

impl DumpScanner<BufReader<BzDecoder<File>>> {
    /// Opens a bzip2-compressed dump. Failure here is fatal to the pipeline
    /// stage: there is nothing to recover from if the dump is absent.
    pub fn open(path: &str) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open dump file: {}", path))?;
        Ok(Self::from_reader(BufReader::new(BzDecoder::new(file))))
    }
}

impl<R: BufRead> DumpScanner<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(64 * 1024),
            pending: Vec::new().into_iter(),
            skipped_tuples: 0,
        }
    }

    /// Tuples that failed to tokenize so far.
    pub fn skipped_tuples(&self) -> u64 {
        self.skipped_tuples
    }

    fn refill(&mut self) -> bool {
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return false,
                Ok(_) => {}
                Err(e) => {
                    // Per-tuple damage is recoverable; a broken decoder is not.
                    warn!(error = %e, "Dump stream ended early");
                    return false;
                }
            }
            if !self.line.starts_with(INSERT_PREFIX) {
                continue;
            }
            let text = String::from_utf8_lossy(&self.line);
            let rows = scan_insert_line(&text, &mut self.skipped_tuples);
            if !rows.is_empty() {
                self.pending = rows.into_iter();
                return true;
            }
        }
    }
}

impl<R: BufRead> Iterator for DumpScanner<R> {
    type Item = Vec<SqlValue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.next() {
                return Some(row);
            }
            if !self.refill() {
                return None;
            }
        }
    }
}

/// Tokenizes every well-formed tuple on one insert line.
fn scan_insert_line(line: &str, skipped: &mut u64) -> Vec<Vec<SqlValue>> {
    let values_at = match line.find("VALUES") {
        Some(pos) => pos + "VALUES".len(),
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    let (spans, dangling) = tuple_spans(&line[values_at..]);
    for span in spans {
        match parse_tuple(span) {
            Some(row) => rows.push(row),
            None => *skipped += 1,
        }
    }
    if dangling {
        *skipped += 1;
    }
    rows
}

/// Splits the VALUES section into top-level `(...)` spans. Parentheses and
/// commas inside string literals do not open, close, or split a span. The
/// flag reports a tuple left open at end of line (truncated dump).
fn tuple_spans(s: &str) -> (Vec<&str>, bool) {
    let bytes = s.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1, // skip the escaped byte
                b'\'' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'\'' => in_string = true,
                b'(' => {
                    if depth == 0 {
                        start = i + 1;
                    }
                    depth += 1;
                }
                b')' => {
                    if depth == 1 {
                        spans.push(&s[start..i]);
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
        }
        i += 1;
    }
    (spans, depth > 0 || in_string)
}

/// Parses one tuple body (the text between a balanced pair of parens) into
/// its fields. Returns `None` if any field is malformed.
fn parse_tuple(span: &str) -> Option<Vec<SqlValue>> {
    let bytes = span.as_bytes();
    let mut values = Vec::new();
    let mut i = 0;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None; // trailing separator or empty field
        }

        if bytes[i] == b'\'' {
            let (text, next) = parse_string(span, i + 1)?;
            values.push(SqlValue::Text(text));
            i = next;
        } else {
            let end = memchr::memchr(b',', &bytes[i..])
                .map(|off| i + off)
                .unwrap_or(bytes.len());
            let token = span[i..end].trim();
            values.push(parse_bare(token)?);
            i = end;
        }

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return Some(values);
        }
        if bytes[i] != b',' {
            return None; // garbage between fields
        }
        i += 1;
    }
}

/// Parses a quoted string starting just past the opening quote. Backslash
/// escapes are decoded here, so `\'` never terminates the literal and titles
/// reach the rest of the pipeline already unescaped.
fn parse_string(span: &str, mut i: usize) -> Option<(String, usize)> {
    let bytes = span.as_bytes();
    let mut out = String::new();

    loop {
        let rel = memchr2(b'\'', b'\\', &bytes[i..])?;
        out.push_str(&span[i..i + rel]);
        let at = i + rel;
        match bytes[at] {
            b'\'' => return Some((out, at + 1)),
            _ => {
                let esc = *bytes.get(at + 1)?;
                out.push(match esc {
                    b'n' => '\n',
                    b't' => '\t',
                    b'r' => '\r',
                    b'0' => '\0',
                    other => other as char,
                });
                i = at + 2;
            }
        }
    }
}

fn parse_bare(token: &str) -> Option<SqlValue> {
    if token.is_empty() {
        return None;
    }
    if token.eq_ignore_ascii_case("NULL") {
        return Some(SqlValue::Null);
    }
    if let Ok(n) = token.parse::<i64>() {
        return Some(SqlValue::Int(n));
    }
    if let Ok(f) = token.parse::<f64>() {
        return Some(SqlValue::Float(f));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(input: &str) -> (Vec<Vec<SqlValue>>, u64) {
        let mut scanner = DumpScanner::from_reader(Cursor::new(input.to_string()));
        let rows: Vec<_> = scanner.by_ref().collect();
        (rows, scanner.skipped_tuples())
    }

    #[test]
    fn scans_simple_tuples() {
        let (rows, skipped) = scan("INSERT INTO `page` VALUES (1,0,'Earth'),(2,0,'Moon');\n");
        assert_eq!(skipped, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![SqlValue::Int(1), SqlValue::Int(0), SqlValue::Text("Earth".into())]
        );
        assert_eq!(rows[1][2], SqlValue::Text("Moon".into()));
    }

    #[test]
    fn skips_non_insert_lines() {
        let input = "-- MySQL dump\nDROP TABLE IF EXISTS `page`;\nLOCK TABLES `page` WRITE;\nINSERT INTO `page` VALUES (1,0,'Earth');\nUNLOCK TABLES;\n";
        let (rows, _) = scan(input);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn escaped_quote_does_not_split_string() {
        let (rows, skipped) = scan(r"INSERT INTO `page` VALUES (1,0,'Earth\'s_crust');
");
        assert_eq!(skipped, 0);
        assert_eq!(rows[0][2], SqlValue::Text("Earth's_crust".into()));
    }

    #[test]
    fn delimiters_inside_strings_are_literal() {
        let (rows, skipped) =
            scan("INSERT INTO `page` VALUES (1,0,'Albert_(disambiguation)'),(2,0,'a,b');\n");
        assert_eq!(skipped, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], SqlValue::Text("Albert_(disambiguation)".into()));
        assert_eq!(rows[1][2], SqlValue::Text("a,b".into()));
    }

    #[test]
    fn escaped_backslash_then_quote_terminates() {
        // \\ decodes to a literal backslash; the following quote closes the string
        let (rows, skipped) = scan(r"INSERT INTO `page` VALUES (1,0,'C:\\');
");
        assert_eq!(skipped, 0);
        assert_eq!(rows[0][2], SqlValue::Text(r"C:\".into()));
    }

    #[test]
    fn decodes_common_escapes() {
        let (rows, _) = scan(r"INSERT INTO `page` VALUES (1,0,'a\nb\tc');
");
        assert_eq!(rows[0][2], SqlValue::Text("a\nb\tc".into()));
    }

    #[test]
    fn malformed_tuple_is_dropped_not_fatal() {
        let (rows, skipped) =
            scan("INSERT INTO `page` VALUES (1,0,'Earth'),(oops,?),(3,0,'Moon');\n");
        assert_eq!(skipped, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], SqlValue::Int(3));
    }

    #[test]
    fn parses_null_and_float_fields() {
        let (rows, skipped) =
            scan("INSERT INTO `page` VALUES (1,0,'Earth','',0,0,0.8574,NULL,123);\n");
        assert_eq!(skipped, 0);
        assert_eq!(rows[0][6], SqlValue::Float(0.8574));
        assert_eq!(rows[0][7], SqlValue::Null);
        assert_eq!(rows[0][8], SqlValue::Int(123));
    }

    #[test]
    fn negative_integers_parse() {
        let (rows, _) = scan("INSERT INTO `t` VALUES (5,-1,'Talk:X');\n");
        assert_eq!(rows[0][1], SqlValue::Int(-1));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut bytes = b"INSERT INTO `page` VALUES (1,0,'Caf\xe9');\n".to_vec();
        bytes.extend_from_slice(b"INSERT INTO `page` VALUES (2,0,'Moon');\n");
        let mut scanner = DumpScanner::from_reader(Cursor::new(bytes));
        let rows: Vec<_> = scanner.by_ref().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], SqlValue::Text("Caf\u{fffd}".into()));
        assert_eq!(rows[1][2], SqlValue::Text("Moon".into()));
    }

    #[test]
    fn multiple_insert_lines_stream_lazily() {
        let input = "INSERT INTO `page` VALUES (1,0,'A');\nINSERT INTO `page` VALUES (2,0,'B');\n";
        let (rows, _) = scan(input);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_file_is_fatal_with_path() {
        let err = DumpScanner::open("/nonexistent/pages.sql.bz2").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pages.sql.bz2"));
    }

    #[test]
    fn empty_tuple_and_garbage_between_fields_are_malformed() {
        let (rows, skipped) = scan("INSERT INTO `t` VALUES (),(1,0,'A'),(1 2,0,'B');\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn truncated_trailing_tuple_is_counted() {
        let (rows, skipped) = scan("INSERT INTO `t` VALUES (1,0,'A'),(2,0,'B\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(skipped, 1);
    }
}
