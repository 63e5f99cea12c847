//! MongoDB client and typed collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::StreamExt;
use mongodb::{
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::KennelError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client and verify the connection with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, KennelError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| KennelError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let mongo = Self {
            client,
            db_name: db_name.to_string(),
        };
        mongo.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(mongo)
    }

    /// Check that the server still answers
    pub async fn ping(&self) -> Result<(), KennelError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| KennelError::Database(format!("MongoDB ping failed: {}", e)))
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, KennelError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, KennelError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        // Apply indexes
        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), KennelError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| KennelError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, KennelError> {
        let metadata = item.mut_metadata();
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(|e| KennelError::Database(format!("Insert failed: {}", e)))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| KennelError::Database("Failed to get inserted ID".into()))
    }

    /// Bulk insert, setting metadata timestamps on every document
    pub async fn insert_many(&self, items: Vec<T>) -> Result<usize, KennelError> {
        if items.is_empty() {
            return Ok(0);
        }

        let now = DateTime::now();
        let items: Vec<T> = items
            .into_iter()
            .map(|mut item| {
                let metadata = item.mut_metadata();
                metadata.created_at = Some(now);
                metadata.updated_at = Some(now);
                item
            })
            .collect();

        let result = self
            .inner
            .insert_many(items)
            .await
            .map_err(|e| KennelError::Database(format!("Bulk insert failed: {}", e)))?;

        Ok(result.inserted_ids.len())
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, KennelError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| KennelError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter
    ///
    /// Documents that fail to decode are logged and skipped, so one
    /// malformed record never fails the whole read.
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, KennelError> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| KennelError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Apply a partial update (`$set` of the provided fields) and return
    /// the updated document
    pub async fn patch_one(
        &self,
        filter: Document,
        mut fields: Document,
    ) -> Result<Option<T>, KennelError> {
        fields.insert("metadata.updated_at", DateTime::now());

        self.inner
            .find_one_and_update(filter, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| KennelError::Database(format!("Update failed: {}", e)))
    }

    /// Delete one document and return it
    pub async fn find_one_and_delete(&self, filter: Document) -> Result<Option<T>, KennelError> {
        self.inner
            .find_one_and_delete(filter)
            .await
            .map_err(|e| KennelError::Database(format!("Delete failed: {}", e)))
    }

    /// Delete every document matching the filter
    pub async fn delete_many(&self, filter: Document) -> Result<u64, KennelError> {
        self.inner
            .delete_many(filter)
            .await
            .map(|r| r.deleted_count)
            .map_err(|e| KennelError::Database(format!("Delete failed: {}", e)))
    }
}
