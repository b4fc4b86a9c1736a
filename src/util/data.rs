//! On-disk form of an index: one bincode file per artifact inside an index
//! directory. The raw document store lives next to them.

use crate::config::{DOCUMENTS_DB_FILE, LEXICON_FILE, METADATA_FILE, POSTINGS_FILE};
use crate::document::{DocumentStore, SourceDocument};
use crate::error::Result;
use crate::index::{
    BuildOptions, BuildReport, Index, IndexSnapshot, Lexicon, MetadataStore, PostingLists, build_index,
    build_index_with,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const BUFFER_SIZE: usize = 1024 * 1024;

pub fn save_index(index: &Index, dir: &Path) -> Result<()> {
    info!(dir = %dir.display(), "saving index");
    let start = Instant::now();
    fs::create_dir_all(dir)?;

    let snapshot = index.snapshot();
    write_artifact(&dir.join(LEXICON_FILE), &snapshot.lexicon)?;
    write_artifact(&dir.join(POSTINGS_FILE), &snapshot.postings)?;
    write_artifact(&dir.join(METADATA_FILE), &snapshot.metadata)?;

    info!(
        documents = index.document_count(),
        terms = index.lexicon().len(),
        elapsed = ?start.elapsed(),
        "index saved"
    );
    Ok(())
}

/// Builds an index from `source` and saves it into `dir`.
///
/// With `rerun` the existing document store is left untouched. Otherwise the
/// store is written to a scratch file that replaces `documents.db` only after
/// the index artifacts are saved, so a failed build keeps the previous store.
pub fn build_index_dir<I>(source: I, dir: &Path, options: &BuildOptions, rerun: bool) -> Result<BuildReport>
where
    I: IntoIterator<Item = Result<SourceDocument>>,
{
    fs::create_dir_all(dir)?;
    if rerun {
        info!("rerun: leaving the document store untouched");
        let (index, report) = build_index(source, options)?;
        save_index(&index, dir)?;
        return Ok(report);
    }

    let scratch = dir.join(format!("{DOCUMENTS_DB_FILE}.tmp"));
    if scratch.exists() {
        fs::remove_file(&scratch)?;
    }
    match build_with_store(source, dir, options, &scratch) {
        Ok(report) => {
            fs::rename(&scratch, dir.join(DOCUMENTS_DB_FILE))?;
            Ok(report)
        }
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&scratch) {
                warn!(path = %scratch.display(), error = %cleanup, "scratch store not removed");
            }
            Err(err)
        }
    }
}

fn build_with_store<I>(source: I, dir: &Path, options: &BuildOptions, store_path: &Path) -> Result<BuildReport>
where
    I: IntoIterator<Item = Result<SourceDocument>>,
{
    let mut store = DocumentStore::open(store_path)?;
    let (index, report) = build_index_with(source, options, |batch| store.insert_batch(batch))?;
    save_index(&index, dir)?;
    Ok(report)
}

/// Loads and validates an index saved by [`save_index`].
pub fn load_index(dir: &Path) -> Result<Index> {
    info!(dir = %dir.display(), "loading index");
    let start = Instant::now();

    let lexicon: Lexicon = read_artifact(&dir.join(LEXICON_FILE))?;
    let postings: PostingLists = read_artifact(&dir.join(POSTINGS_FILE))?;
    let metadata: MetadataStore = read_artifact(&dir.join(METADATA_FILE))?;

    let index = Index::from_snapshot(IndexSnapshot {
        lexicon,
        postings,
        metadata,
    })?;

    info!(
        documents = index.document_count(),
        terms = index.lexicon().len(),
        elapsed = ?start.elapsed(),
        "index loaded"
    );
    Ok(index)
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let start = Instant::now();
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, File::create(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    debug!(path = %path.display(), elapsed = ?start.elapsed(), "artifact written");
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let start = Instant::now();
    let reader = BufReader::with_capacity(BUFFER_SIZE, File::open(path)?);
    let value = bincode::deserialize_from(reader)?;
    debug!(path = %path.display(), elapsed = ?start.elapsed(), "artifact read");
    Ok(value)
}
