//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Routing is a single
//! match over (method, path); every handler is stateless and reads a
//! fresh snapshot of the record set, so requests are safe to serve
//! concurrently.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::db::schemas::{BreedDoc, DOG_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::routes;
use crate::types::KennelError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: MongoClient,
    /// Typed handle to the breed collection
    pub dogs: MongoCollection<BreedDoc>,
}

impl AppState {
    /// Create application state, constructing the typed collection
    /// (which applies the schema indexes)
    pub async fn new(args: Args, mongo: MongoClient) -> Result<Self, KennelError> {
        let dogs = mongo.collection::<BreedDoc>(DOG_COLLECTION).await?;
        Ok(Self { args, mongo, dogs })
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), KennelError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Kennel listening on {}", state.args.listen);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // ====================================================================
        // CRUD over breed records
        // ====================================================================
        (Method::POST, "/dogs") => routes::handle_create_dog(req, Arc::clone(&state)).await,

        (Method::GET, "/dogs") => routes::handle_list_dogs(Arc::clone(&state)).await,

        (Method::GET, p) if p.starts_with("/dogs/") => {
            let id = p.strip_prefix("/dogs/").unwrap_or("");
            routes::handle_get_dog(Arc::clone(&state), id).await
        }

        (Method::PATCH, p) if p.starts_with("/dogs/") => {
            let id = p.strip_prefix("/dogs/").unwrap_or("").to_string();
            routes::handle_update_dog(req, Arc::clone(&state), &id).await
        }

        (Method::DELETE, p) if p.starts_with("/dogs/") => {
            let id = p.strip_prefix("/dogs/").unwrap_or("");
            routes::handle_delete_dog(Arc::clone(&state), id).await
        }

        // ====================================================================
        // Question endpoints: aggregate statistics over the full record set
        // ====================================================================
        (Method::GET, "/questions/average-weight") => {
            routes::handle_average_weight(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/longest-average-lifespan") => {
            routes::handle_longest_average_lifespan(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/tallest-breed") => {
            routes::handle_tallest_breed(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/heaviest-group-by-average") => {
            routes::handle_heaviest_group(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/median-weight-small-breeds") => {
            routes::handle_median_weight_small_breeds(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/widest-weight-range") => {
            routes::handle_widest_weight_range(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/count-intelligent-temperament") => {
            routes::handle_count_intelligent_temperament(Arc::clone(&state)).await
        }
        (Method::GET, "/questions/lapdog-breeds") => {
            routes::handle_lapdog_breeds(Arc::clone(&state)).await
        }

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PATCH, DELETE, OPTIONS",
        )
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response for unknown routes
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
