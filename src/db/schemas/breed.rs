//! Dog breed document schema
//!
//! Stored documents come from a historically messy dataset: nested ranges
//! may be missing either bound, weight/height carry independent imperial
//! and metric sub-ranges that are not guaranteed to agree, and
//! `temperament` is either a normalized list or a single comma-separated
//! string. The shape is validated here at the store boundary; the
//! string-or-list normalization lives in `stats::extract`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for breed records
pub const DOG_COLLECTION: &str = "dogs";

/// A `{min, max}` numeric pair; either bound may be absent
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Dual-unit range with independent imperial and metric sub-ranges
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UnitRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imperial: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Range>,
}

/// Temperament as stored: a list of strings, or the historical single
/// comma-separated string
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Temperament {
    List(Vec<String>),
    Text(String),
}

impl Default for Temperament {
    fn default() -> Self {
        Temperament::List(Vec::new())
    }
}

/// Breed document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BreedDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Externally-assigned numeric identifier, unique within the dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name
    pub name: String,

    /// Category string, e.g. "Working"; records without one group under
    /// "Unknown"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_group: Option<String>,

    /// Free-text original purpose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bred_for: Option<String>,

    /// Lifespan range in years
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_span: Option<Range>,

    /// Weight: imperial in lbs, metric in kg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<UnitRange>,

    /// Height: imperial in inches, metric in cm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<UnitRange>,

    #[serde(default)]
    pub temperament: Temperament,

    #[serde(default)]
    pub origin: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_id: Option<String>,
}

impl IntoIndexes for BreedDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on the external numeric id; sparse because the
            // field is optional
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "name": 1 },
                Some(
                    IndexOptions::builder()
                        .name("name_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "breed_group": 1 },
                Some(
                    IndexOptions::builder()
                        .name("breed_group_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for BreedDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
