use clap::{Parser, Subcommand};
use newswire_search::config::{DOCUMENTS_DB_FILE, RESULTS_SHOWN};
use newswire_search::document::open_corpus;
use newswire_search::engine::{collect_hits, render_hits, score_tokens};
use newswire_search::repl::Repl;
use newswire_search::{
    Bm25Params, BuildOptions, DocumentStore, Result, build_index_dir, load_index, tokenize,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newswire", about = "BM25 search over newswire corpora", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index directory from a corpus file (`.gz` is decompressed)
    Index {
        source: PathBuf,
        index_dir: PathBuf,
        /// Keep the existing document store; only rebuild the index files
        #[arg(long)]
        rerun: bool,
        /// Abort on the first malformed or duplicate document
        #[arg(long)]
        strict: bool,
    },
    /// Interactive retrieval over an index directory
    Retrieve {
        index_dir: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Run one query and print the ranked results
    Query {
        index_dir: PathBuf,
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long, default_value_t = RESULTS_SHOWN)]
        limit: usize,
        /// Print hits as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(clap::Args)]
struct ParamArgs {
    #[arg(long)]
    k1: Option<f64>,
    #[arg(long)]
    b: Option<f64>,
    #[arg(long)]
    k2: Option<f64>,
}

impl ParamArgs {
    fn resolve(&self) -> Bm25Params {
        let default = Bm25Params::default();
        Bm25Params {
            k1: self.k1.unwrap_or(default.k1),
            b: self.b.unwrap_or(default.b),
            k2: self.k2.unwrap_or(default.k2),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newswire_search=info,newswire=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Index {
            source,
            index_dir,
            rerun,
            strict,
        } => index(&source, &index_dir, rerun, BuildOptions { strict }),
        Command::Retrieve { index_dir, params } => retrieve(&index_dir, params.resolve()),
        Command::Query {
            index_dir,
            query,
            limit,
            json,
            params,
        } => query_once(&index_dir, &query.join(" "), limit, json, params.resolve()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn index(source: &Path, index_dir: &Path, rerun: bool, options: BuildOptions) -> Result<()> {
    let corpus = open_corpus(source)?;
    let report = build_index_dir(corpus, index_dir, &options, rerun)?;
    info!(
        indexed = report.indexed,
        skipped = report.skipped.len(),
        dir = %index_dir.display(),
        "index created"
    );
    Ok(())
}

fn retrieve(index_dir: &Path, params: Bm25Params) -> Result<()> {
    let index = load_index(index_dir)?;
    let store = DocumentStore::open_existing(&index_dir.join(DOCUMENTS_DB_FILE))?;
    let stdin = io::stdin();
    Repl::new(&index, &store, params).run(stdin.lock(), io::stdout().lock())
}

fn query_once(index_dir: &Path, query: &str, limit: usize, json: bool, params: Bm25Params) -> Result<()> {
    let index = load_index(index_dir)?;
    let store = DocumentStore::open_existing(&index_dir.join(DOCUMENTS_DB_FILE))?;

    let tokens = tokenize(query);
    let results = score_tokens(&tokens, &index, &params);
    let hits = collect_hits(&index, &store, &tokens, &results, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print!("{}", render_hits(&hits));
    }
    Ok(())
}
