//! HTTP routes

pub mod breeds;
pub mod health;
pub mod questions;

pub use breeds::{
    handle_create_dog, handle_delete_dog, handle_get_dog, handle_list_dogs, handle_update_dog,
};
pub use health::health_check;
pub use questions::{
    handle_average_weight, handle_count_intelligent_temperament, handle_heaviest_group,
    handle_lapdog_breeds, handle_longest_average_lifespan, handle_median_weight_small_breeds,
    handle_tallest_breed, handle_widest_weight_range,
};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::types::KennelError;

/// Serialize a body into a JSON response with CORS headers
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response<Full<Bytes>> {
    match serde_json::to_string_pretty(&body) {
        Ok(json) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("Failed to build response")))
                    .unwrap()
            }),
        Err(_) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::from("Failed to serialize response")))
            .unwrap(),
    }
}

/// 404 for a missing record, with the API's historical body shape
pub(crate) fn not_found() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        serde_json::json!({ "message": "Not found" }),
    )
}

/// 500 for a failed store operation
pub(crate) fn db_error_response(err: KennelError) -> Response<Full<Bytes>> {
    warn!("Store operation failed: {}", err);
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "error": err.to_string() }),
    )
}
