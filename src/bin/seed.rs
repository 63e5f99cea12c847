//! Kennel Seeder - bulk-load normalized breed records
//!
//! Reads a JSON array of breed records and replaces the contents of the
//! dogs collection.
//!
//! Usage:
//!   kennel-seed --file data/dogdata.json
//!
//! Environment variables:
//!   SEED_FILE   - path to the JSON file (default: data/dogdata.json)
//!   MONGODB_URI - MongoDB connection URI (default: mongodb://localhost:27017)
//!   MONGODB_DB  - database name (default: dogdb)

use bson::doc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kennel::db::schemas::{BreedDoc, DOG_COLLECTION};
use kennel::db::MongoClient;
use kennel::types::{KennelError, Result};

#[derive(Parser, Debug)]
#[command(name = "kennel-seed")]
#[command(about = "Bulk seeder for the dogs collection")]
struct Args {
    /// Path to a JSON array of normalized breed records
    #[arg(long, env = "SEED_FILE", default_value = "data/dogdata.json")]
    file: PathBuf,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "dogdb")]
    mongodb_db: String,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = seed(&args).await {
        error!("Seed error: {}", e);
        std::process::exit(1);
    }
}

async fn seed(args: &Args) -> Result<()> {
    info!("Using JSON: {}", args.file.display());

    let raw = std::fs::read_to_string(&args.file)?;
    let rows: Vec<BreedDoc> = serde_json::from_str(&raw).map_err(|e| {
        KennelError::InvalidRequest(format!("Expected an array of breed records: {}", e))
    })?;

    let mongo = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    let dogs = mongo.collection::<BreedDoc>(DOG_COLLECTION).await?;

    let removed = dogs.delete_many(doc! {}).await?;
    info!("Cleared {} existing records", removed);

    let inserted = dogs.insert_many(rows).await?;
    info!("Seeded {} dogs", inserted);

    Ok(())
}
