//! Reader for TREC-style SGML corpora (`<DOC> ... </DOC>` records, as in
//! the LA Times collection), plain or gzip-compressed.

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static DOCNO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<DOCNO>(.*?)</DOCNO>").expect("valid DOCNO regex"));
static HEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<HEADLINE>(.*?)</HEADLINE>").expect("valid HEADLINE regex"));
static TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<TEXT>(.*?)</TEXT>").expect("valid TEXT regex"));
static GRAPHIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<GRAPHIC>(.*?)</GRAPHIC>").expect("valid GRAPHIC regex"));
static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<TABLE>(.*?)</TABLE>").expect("valid TABLE regex"));
static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<TABLECELL[^>]*>(.*?)</TABLECELL>").expect("valid TABLECELL regex")
});
static P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<P>(.*?)</P>").expect("valid P regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Opens a corpus file, decompressing it when the name ends in `.gz`.
pub fn open_corpus(path: &Path) -> Result<CorpusReader<Box<dyn BufRead>>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(CorpusReader::new(reader))
}

/// Yields one [`SourceDocument`] per `<DOC>` record.
///
/// A record that cannot be parsed, including one that is not valid UTF-8,
/// yields a per-document `Error::Parse` and reading continues; read
/// failures are passed through as `Error::Io`.
pub struct CorpusReader<R> {
    reader: R,
    line: Vec<u8>,
    record: Vec<u8>,
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            record: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let content = self.line.trim_ascii();
            if self.record.is_empty() && content.is_empty() {
                continue;
            }
            let closes = content == b"</DOC>";
            self.record.extend_from_slice(&self.line);
            if !self.line.ends_with(b"\n") {
                self.record.push(b'\n');
            }
            if closes {
                let bytes = std::mem::take(&mut self.record);
                return Some(decode_record(bytes).and_then(parse_record));
            }
        }
    }
}

impl<R> Drop for CorpusReader<R> {
    fn drop(&mut self) {
        if !self.record.trim_ascii().is_empty() {
            warn!(bytes = self.record.len(), "corpus ended inside an unterminated record");
        }
    }
}

fn decode_record(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let lossy = String::from_utf8_lossy(e.as_bytes());
        let docno = DOCNO_RE.captures(&lossy).map(|c| clean(&c[1])).unwrap_or_default();
        Error::parse(docno, format!("record is not valid UTF-8: {}", e.utf8_error()))
    })
}

/// Parses one `<DOC>` record.
pub fn parse_record(raw: String) -> Result<SourceDocument> {
    let docno = DOCNO_RE
        .captures(&raw)
        .map(|c| clean(&c[1]))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::parse("", "record has no DOCNO"))?;

    let headline = join(
        HEADLINE_RE
            .captures_iter(&raw)
            .flat_map(|c| paragraphs(c.get(1).map_or("", |m| m.as_str()))),
    );

    let mut text = Vec::new();
    let mut tables = Vec::new();
    for section in TEXT_RE.captures_iter(&raw) {
        let section = section.get(1).map_or("", |m| m.as_str());
        for table in TABLE_RE.captures_iter(section) {
            tables.extend(CELL_RE.captures_iter(&table[1]).map(|c| clean(&c[1])));
        }
        let without_tables = TABLE_RE.replace_all(section, " ");
        text.extend(paragraphs(&without_tables));
    }
    let graphics = GRAPHIC_RE
        .captures_iter(&raw)
        .flat_map(|c| paragraphs(c.get(1).map_or("", |m| m.as_str())));

    let body = join(text.into_iter().chain(tables).chain(graphics));

    Ok(SourceDocument {
        docno,
        headline,
        body,
        raw,
    })
}

/// `<P>` contents of a section, or the whole section when it has none.
fn paragraphs(section: &str) -> Vec<String> {
    let found: Vec<String> = P_RE.captures_iter(section).map(|c| clean(&c[1])).collect();
    if found.is_empty() {
        vec![clean(section)]
    } else {
        found
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Strips markup, decodes the predefined XML entities and collapses
/// whitespace (including newlines) to single spaces.
fn clean(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, " ");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
