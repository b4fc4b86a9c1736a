use crate::errors::ApiError;
use actix_web::{HttpResponse, Responder, get, post, web};
use newswire_search::config::{DOCUMENTS_DB_FILE, RESULTS_SHOWN};
use newswire_search::engine::{collect_hits, score_tokens, summarize_tokens};
use newswire_search::{Bm25Params, DocumentFetcher, DocumentStore, Index, load_index, tokenize};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Shared by every worker: the frozen index is read concurrently, the
/// SQLite connection one request at a time.
pub struct AppState {
    index: Arc<Index>,
    documents: Mutex<DocumentStore>,
    params: Bm25Params,
}

impl AppState {
    pub fn new(index: Index, documents: DocumentStore, params: Bm25Params) -> Self {
        Self {
            index: Arc::new(index),
            documents: Mutex::new(documents),
            params,
        }
    }

    pub fn load(index_dir: &Path, params: Bm25Params) -> newswire_search::Result<Self> {
        let index = load_index(index_dir)?;
        let documents = DocumentStore::open_existing(&index_dir.join(DOCUMENTS_DB_FILE))?;
        Ok(Self::new(index, documents, params))
    }

    fn documents(&self) -> Result<MutexGuard<'_, DocumentStore>, ApiError> {
        self.documents.lock().map_err(|_| ApiError::StoreUnavailable)
    }
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    query: String,
    text: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(stats)
        .service(search)
        .service(summarize)
        .service(document);
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Newswire Retrieval API")
}

#[get("/stats")]
async fn stats(state: web::Data<AppState>) -> impl Responder {
    let index = &state.index;
    HttpResponse::Ok().json(serde_json::json!({
        "document_count": index.document_count(),
        "vocabulary_size": index.lexicon().len(),
        "average_length": index.average_length(),
    }))
}

#[post("/search")]
async fn search(
    request: web::Json<SearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tokens = tokenize(&request.query);
    if tokens.is_empty() {
        return Err(ApiError::EmptyQuery);
    }
    let limit = request.limit.unwrap_or(RESULTS_SHOWN);

    let results = score_tokens(&tokens, &state.index, &state.params);
    let hits = {
        let documents = state.documents()?;
        collect_hits(&state.index, &*documents, &tokens, &results, limit)?
    };
    debug!(query = %request.query, matched = results.len(), returned = hits.len(), "search");
    Ok(HttpResponse::Ok().json(hits))
}

#[post("/summarize")]
async fn summarize(request: web::Json<SummarizeRequest>) -> impl Responder {
    let sentences = summarize_tokens(&tokenize(&request.query), &request.text);
    HttpResponse::Ok().json(sentences)
}

#[get("/documents/{docno}")]
async fn document(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let docno = path.into_inner();
    let raw = state.documents()?.raw(&docno)?;
    info!(docno = %docno, "document served");
    Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(raw))
}
