use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

use crate::config;
use crate::config::StoreMode;
use crate::post::{Draft, Post, PostId};

pub mod document_storage;
pub mod local_store;
pub mod remote_store;

use document_storage::{DocumentStorage, FileStorage};
use local_store::LocalStore;
use remote_store::RemoteStore;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("posts are unavailable: {0}")]
    Unavailable(String),
    #[error("post {0} was not found")]
    NotFound(PostId),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not reach the post service: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
    #[error("storage is full, the post could not be saved")]
    QuotaExceeded,
    #[error("could not save posts: {0}")]
    Storage(String),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DisplayOrder {
    /// Newest first, sorted by the caller
    DateDescending,
    /// Whatever order the source returned
    Backend,
}

/// Where the posts of one page session live.
///
/// A store is opened empty for each page load; `load` fills the in-memory
/// snapshot that `list` and `categories` read from.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn load(&mut self) -> Result<(), LoadError>;

    fn is_loaded(&self) -> bool;

    /// Whether the page load itself populates the store, before any controller
    /// runs. True for synchronous local documents.
    fn loads_on_page_load(&self) -> bool;

    fn list(&self) -> Vec<Post>;

    fn display_order(&self) -> DisplayOrder;

    /// Categories this store knows besides the defaults
    fn categories(&self) -> Vec<String>;

    async fn get(&self, id: &PostId) -> Result<Post, LoadError>;

    async fn create(&mut self, draft: Draft) -> Result<Post, SaveError>;
}

/// Opens one store per page session, as selected by configuration
#[derive(Clone)]
pub enum StoreBackend {
    Local {
        storage: Arc<dyn DocumentStorage>,
        key: String,
        default_categories: Vec<String>,
        /// Shared by every store opened on the document
        write_lock: Arc<Mutex<()>>,
    },
    Remote {
        client: reqwest::Client,
        endpoint: Url,
    },
}

impl StoreBackend {
    pub fn from_config(cfg: &config::Config) -> anyhow::Result<StoreBackend> {
        let store = &cfg.store;
        match store.mode {
            StoreMode::Local => {
                let document_dir = store.document_dir.clone()
                    .ok_or_else(|| anyhow!("store.document_dir is not set"))?;
                let storage = FileStorage::new(document_dir, store.quota_bytes());
                Ok(StoreBackend::Local {
                    storage: Arc::new(storage),
                    key: store.document_key().to_string(),
                    default_categories: cfg.defaults.categories.clone(),
                    write_lock: Arc::new(Mutex::new(())),
                })
            }
            StoreMode::Remote => {
                let endpoint = store.endpoint.as_deref()
                    .ok_or_else(|| anyhow!("store.endpoint is not set"))?;
                let endpoint = Url::parse(endpoint)
                    .with_context(|| format!("Invalid store endpoint {}", endpoint))?;
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(15))
                    .build()?;
                Ok(StoreBackend::Remote { client, endpoint })
            }
        }
    }

    pub fn open(&self) -> Box<dyn PostStore> {
        match self {
            StoreBackend::Local { storage, key, default_categories, write_lock } => {
                let store = LocalStore::new(storage.clone(), key, default_categories.clone())
                    .with_write_lock(write_lock.clone());
                Box::new(store)
            }
            StoreBackend::Remote { client, endpoint } => {
                Box::new(RemoteStore::new(client.clone(), endpoint.clone()))
            }
        }
    }
}
