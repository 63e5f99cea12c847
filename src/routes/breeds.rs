//! CRUD endpoints for breed records
//!
//! ## Endpoints
//!
//! - `POST /dogs` — create from a full or partial record body
//! - `GET /dogs` — list all records
//! - `GET /dogs/{id}` — fetch one
//! - `PATCH /dogs/{id}` — partial update (merge semantics)
//! - `DELETE /dogs/{id}` — delete
//!
//! A path id made of digits only resolves against the external numeric
//! `id` field; anything else is treated as the store's internal ObjectId.

use bson::{doc, oid::ObjectId, Document};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::db::schemas::{BreedDoc, Range, Temperament, UnitRange};
use crate::server::AppState;

use super::{db_error_response, json_response, not_found};

/// Fields accepted by PATCH; provided fields overwrite, absent fields are
/// retained
#[derive(Debug, Default, Deserialize)]
pub struct BreedPatch {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub breed_group: Option<String>,
    pub bred_for: Option<String>,
    pub life_span: Option<Range>,
    pub weight: Option<UnitRange>,
    pub height: Option<UnitRange>,
    pub temperament: Option<Temperament>,
    pub origin: Option<Vec<String>>,
    pub reference_image_id: Option<String>,
}

/// Resolve a path id into a lookup filter
///
/// All-digits ids target the external numeric `id` field (even when a
/// record's internal identifier happens to look numeric in string form);
/// everything else is parsed as an ObjectId. Unparseable ids match
/// nothing.
fn id_filter(id: &str) -> Option<Document> {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        id.parse::<i64>().ok().map(|n| doc! { "id": n })
    } else {
        ObjectId::parse_str(id).ok().map(|oid| doc! { "_id": oid })
    }
}

/// Build the `$set` document for a partial update
fn patch_set_doc(patch: &BreedPatch) -> Result<Document, bson::ser::Error> {
    let mut set = Document::new();

    if let Some(id) = patch.id {
        set.insert("id", id);
    }
    if let Some(ref name) = patch.name {
        set.insert("name", name.clone());
    }
    if let Some(ref breed_group) = patch.breed_group {
        set.insert("breed_group", breed_group.clone());
    }
    if let Some(ref bred_for) = patch.bred_for {
        set.insert("bred_for", bred_for.clone());
    }
    if let Some(ref life_span) = patch.life_span {
        set.insert("life_span", bson::to_bson(life_span)?);
    }
    if let Some(ref weight) = patch.weight {
        set.insert("weight", bson::to_bson(weight)?);
    }
    if let Some(ref height) = patch.height {
        set.insert("height", bson::to_bson(height)?);
    }
    if let Some(ref temperament) = patch.temperament {
        set.insert("temperament", bson::to_bson(temperament)?);
    }
    if let Some(ref origin) = patch.origin {
        set.insert("origin", bson::to_bson(origin)?);
    }
    if let Some(ref reference_image_id) = patch.reference_image_id {
        set.insert("reference_image_id", reference_image_id.clone());
    }

    Ok(set)
}

/// Public JSON shape for a stored record: `_id` exposed as a hex string,
/// internal metadata stripped
pub(crate) fn public_json(dog: &BreedDoc) -> Value {
    let mut value = serde_json::to_value(dog).unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = value {
        map.remove("metadata");
        if let Some(oid) = dog._id {
            map.insert("_id".to_string(), Value::String(oid.to_hex()));
        }
    }
    value
}

/// Handle POST /dogs
pub async fn handle_create_dog(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Failed to read body: {}", e) }),
            );
        }
    };

    let mut dog: BreedDoc = match serde_json::from_slice(&body) {
        Ok(d) => d,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Invalid breed record: {}", e) }),
            );
        }
    };
    dog._id = None;

    let oid = match state.dogs.insert_one(dog).await {
        Ok(oid) => oid,
        Err(e) => return db_error_response(e),
    };

    // Read the record back so the response carries store-assigned fields
    match state.dogs.find_one(doc! { "_id": oid }).await {
        Ok(Some(created)) => json_response(StatusCode::CREATED, public_json(&created)),
        Ok(None) => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Created record not found" }),
        ),
        Err(e) => db_error_response(e),
    }
}

/// Handle GET /dogs
pub async fn handle_list_dogs(state: Arc<AppState>) -> Response<Full<Bytes>> {
    match state.dogs.find_many(doc! {}).await {
        Ok(dogs) => {
            let records: Vec<Value> = dogs.iter().map(public_json).collect();
            json_response(StatusCode::OK, records)
        }
        Err(e) => db_error_response(e),
    }
}

/// Handle GET /dogs/{id}
pub async fn handle_get_dog(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let Some(filter) = id_filter(id) else {
        return not_found();
    };

    match state.dogs.find_one(filter).await {
        Ok(Some(dog)) => json_response(StatusCode::OK, public_json(&dog)),
        Ok(None) => not_found(),
        Err(e) => db_error_response(e),
    }
}

/// Handle PATCH /dogs/{id}
pub async fn handle_update_dog(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<Full<Bytes>> {
    let Some(filter) = id_filter(id) else {
        return not_found();
    };

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Failed to read body: {}", e) }),
            );
        }
    };

    let patch: BreedPatch = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Invalid patch: {}", e) }),
            );
        }
    };

    let set = match patch_set_doc(&patch) {
        Ok(s) => s,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Invalid patch: {}", e) }),
            );
        }
    };

    // Empty patch: nothing to write, return the record as-is
    if set.is_empty() {
        return match state.dogs.find_one(filter).await {
            Ok(Some(dog)) => json_response(StatusCode::OK, public_json(&dog)),
            Ok(None) => not_found(),
            Err(e) => db_error_response(e),
        };
    }

    match state.dogs.patch_one(filter, set).await {
        Ok(Some(updated)) => json_response(StatusCode::OK, public_json(&updated)),
        Ok(None) => not_found(),
        Err(e) => db_error_response(e),
    }
}

/// Handle DELETE /dogs/{id}
pub async fn handle_delete_dog(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let Some(filter) = id_filter(id) else {
        return not_found();
    };

    match state.dogs.find_one_and_delete(filter).await {
        Ok(Some(_)) => json_response(StatusCode::OK, serde_json::json!({ "deleted": true })),
        Ok(None) => not_found(),
        Err(e) => db_error_response(e),
    }
}
