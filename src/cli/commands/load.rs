//! Load command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::cli::output::get_formatter;
use crate::models::{Config, LoadSettings, OutputFormat};
use crate::services::{
    CollectionSchema, Embedder, EmbeddingClient, QdrantBackend, VectorStore, run_load,
};

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Parquet catalog to load
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Target collection
    #[arg(long, short = 'c')]
    pub collection: Option<String>,

    /// Points per upsert call
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Size of the dense vector when the collection is created
    #[arg(long)]
    pub dense_dim: Option<u64>,

    /// Qdrant gRPC endpoint
    #[arg(long, env = "QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    pub qdrant_api_key: Option<String>,

    /// Compute dense vectors for rows without one using the embedding server
    #[arg(long)]
    pub embed_missing: bool,
}

impl LoadArgs {
    fn into_settings(self, config: Config) -> Result<LoadSettings> {
        let Config {
            mut vector_store,
            mut catalog,
            embedding,
            ..
        } = config;

        if let Some(collection) = self.collection {
            vector_store.collection = collection;
        }
        if let Some(url) = self.qdrant_url {
            vector_store.url = url;
        }
        if self.qdrant_api_key.is_some() {
            vector_store.api_key = self.qdrant_api_key;
        }
        if let Some(batch_size) = self.batch_size {
            catalog.batch_size = batch_size;
        }
        if let Some(dense_dim) = self.dense_dim {
            catalog.dense_dim = dense_dim;
        }

        let input = self
            .input
            .or_else(|| catalog.input.clone())
            .context("no catalog given; pass --input or set catalog.input in the config")?;

        let settings = LoadSettings {
            input,
            embed_missing: self.embed_missing,
            catalog,
            vector_store,
            embedding,
        };
        Ok(settings.validate()?)
    }
}

pub async fn handle_load(args: LoadArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let settings = args.into_settings(config)?;

    if verbose {
        eprintln!(
            "Loading {} into {} at {}",
            settings.input.display(),
            settings.vector_store.collection,
            settings.vector_store.url
        );
    }

    let schema = CollectionSchema::from_catalog(&settings.catalog);
    let store = QdrantBackend::new(&settings.vector_store, &schema)?;

    let embedder = if settings.embed_missing {
        Some(EmbeddingClient::new(&settings.embedding)?)
    } else {
        None
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})",
            )
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let stats = run_load(
        &settings,
        &store,
        embedder.as_ref().map(|e| e as &dyn Embedder),
        &pb,
    )
    .await
    .context("catalog load failed")?;

    let info = store.collection_info().await?;
    print!("{}", formatter.format_load(&stats, info.as_ref()));

    Ok(())
}
