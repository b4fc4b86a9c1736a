//! Raw and body text of indexed documents, kept outside the index so the
//! REPL and the service can print them and summarize them on demand.

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Read access to stored documents.
pub trait DocumentFetcher {
    /// The record exactly as it appeared in the corpus.
    fn raw(&self, docno: &str) -> Result<String>;

    /// Article text, table cells and graphic captions with newlines removed.
    fn body(&self, docno: &str) -> Result<String>;
}

/// SQLite-backed document store.
pub struct DocumentStore {
    conn: Connection,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    docno TEXT PRIMARY KEY,
    raw   TEXT NOT NULL,
    body  TEXT NOT NULL
)";

impl DocumentStore {
    /// Opens the store at `path`, creating it when absent.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a store written by an earlier build. A missing file is an
    /// `Error::Io` with kind `NotFound` rather than a fresh empty store.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document store at {}", path.display()),
            )
            .into());
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::with_connection(Connection::open_with_flags(path, flags)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Stores a batch in a single transaction. A document stored twice
    /// keeps its latest text.
    pub fn insert_batch(&mut self, docs: &[&SourceDocument]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT OR REPLACE INTO documents (docno, raw, body) VALUES (?1, ?2, ?3)")?;
            for doc in docs {
                stmt.execute(params![doc.docno, doc.raw, doc.body])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn column(&self, sql: &str, docno: &str) -> Result<String> {
        self.conn
            .query_row(sql, [docno], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::DocumentNotFound(docno.to_string()))
    }
}

impl DocumentFetcher for DocumentStore {
    fn raw(&self, docno: &str) -> Result<String> {
        self.column("SELECT raw FROM documents WHERE docno = ?1", docno)
    }

    fn body(&self, docno: &str) -> Result<String> {
        self.column("SELECT body FROM documents WHERE docno = ?1", docno)
    }
}

/// In-memory store, for tests and small corpora.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocuments {
    docs: HashMap<String, (String, String)>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc: &SourceDocument) {
        self.docs
            .insert(doc.docno.clone(), (doc.raw.clone(), doc.body.clone()));
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<'a> FromIterator<&'a SourceDocument> for MemoryDocuments {
    fn from_iter<I: IntoIterator<Item = &'a SourceDocument>>(iter: I) -> Self {
        let mut docs = Self::new();
        for doc in iter {
            docs.insert(doc);
        }
        docs
    }
}

impl DocumentFetcher for MemoryDocuments {
    fn raw(&self, docno: &str) -> Result<String> {
        self.docs
            .get(docno)
            .map(|(raw, _)| raw.clone())
            .ok_or_else(|| Error::DocumentNotFound(docno.to_string()))
    }

    fn body(&self, docno: &str) -> Result<String> {
        self.docs
            .get(docno)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| Error::DocumentNotFound(docno.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(docno: &str, body: &str) -> SourceDocument {
        let mut doc = SourceDocument::new(docno, "Headline", body);
        doc.raw = format!("<DOC><DOCNO>{docno}</DOCNO>{body}</DOC>");
        doc
    }

    #[test]
    fn test_insert_and_fetch() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        let a = sample("LA010189-0001", "the cat sat.");
        let b = sample("LA010189-0002", "birds fly.");
        store.insert_batch(&[&a, &b]).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.body("LA010189-0001").unwrap(), "the cat sat.");
        assert_eq!(store.raw("LA010189-0002").unwrap(), b.raw);
    }

    #[test]
    fn test_unknown_docno_is_not_found() {
        let store = DocumentStore::open_in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(matches!(store.raw("LA010189-0009"), Err(Error::DocumentNotFound(_))));
        assert!(matches!(store.body("LA010189-0009"), Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut store = DocumentStore::open_in_memory().unwrap();
        store.insert_batch(&[&sample("LA010189-0001", "old")]).unwrap();
        store.insert_batch(&[&sample("LA010189-0001", "new")]).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.body("LA010189-0001").unwrap(), "new");
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.db");
        {
            let mut store = DocumentStore::open(&path).unwrap();
            store.insert_batch(&[&sample("LA010189-0001", "kept")]).unwrap();
        }
        let store = DocumentStore::open(&path).unwrap();
        assert_eq!(store.body("LA010189-0001").unwrap(), "kept");
    }

    #[test]
    fn test_open_existing_requires_a_built_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.db");

        let err = DocumentStore::open_existing(&path).err().unwrap();
        assert!(matches!(&err, Error::Io(e) if e.kind() == io::ErrorKind::NotFound));
        assert!(!path.exists());

        DocumentStore::open(&path)
            .unwrap()
            .insert_batch(&[&sample("LA010189-0001", "kept")])
            .unwrap();
        let store = DocumentStore::open_existing(&path).unwrap();
        assert_eq!(store.body("LA010189-0001").unwrap(), "kept");
    }

    #[test]
    fn test_memory_documents() {
        let a = sample("LA010189-0001", "alpha");
        let docs: MemoryDocuments = [&a].into_iter().collect();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs.body("LA010189-0001").unwrap(), "alpha");
        assert_eq!(docs.raw("LA010189-0001").unwrap(), a.raw);
        assert!(docs.raw("nope").unwrap_err().is_not_found());
    }
}
