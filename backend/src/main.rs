use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use newswire_search::Bm25Params;
use newswire_search::config::DEFAULT_BIND_ADDR;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod errors;
mod routes;

use routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "newswire-backend", about = "HTTP search service over a newswire index")]
struct Args {
    /// Directory written by `newswire index`
    #[arg(long, env = "NEWSWIRE_INDEX_DIR")]
    index_dir: PathBuf,

    #[arg(long, env = "NEWSWIRE_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("newswire_backend=info,newswire_search=info")),
        )
        .init();

    let args = Args::parse();
    let state = match AppState::load(&args.index_dir, Bm25Params::default()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!(dir = %args.index_dir.display(), error = %e, "cannot load index");
            return Err(io::Error::other(e));
        }
    };

    info!(bind = %args.bind, "starting HTTP server");
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(&args.bind)?
    .run()
    .await
}
