use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spdlog::{error, info, warn};
use uuid::Uuid;

use crate::category;
use crate::post::{seed_posts, Draft, Post, PostId};
use crate::store::document_storage::{DocumentStorage, StorageError};
use crate::store::{DisplayOrder, LoadError, PostStore, SaveError};

/// Shape of the persisted document
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDocument {
    pub blogs: Vec<Post>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Posts kept in one document of a [`DocumentStorage`]. The whole document is
/// written back on every change.
///
/// Stores opened on the same document must share one write lock: `create`
/// re-reads the document while holding it, so concurrent sessions append
/// instead of overwriting each other.
pub struct LocalStore {
    storage: Arc<dyn DocumentStorage>,
    key: String,
    default_categories: Vec<String>,
    document: BlogDocument,
    loaded: bool,
    /// Raw content of a document that did not parse, not yet backed up
    corrupt: Option<String>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn DocumentStorage>, key: &str, default_categories: Vec<String>) -> Self {
        LocalStore {
            storage,
            key: key.to_string(),
            default_categories,
            document: BlogDocument::default(),
            loaded: false,
            corrupt: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_write_lock(mut self, write_lock: Arc<Mutex<()>>) -> Self {
        self.write_lock = write_lock;
        self
    }

    /// Key the unreadable document is copied to before it gets replaced
    pub fn backup_key(&self) -> String {
        format!("{}-corrupt", self.key)
    }

    fn seed_document(&self) -> BlogDocument {
        let blogs = seed_posts();
        let categories = category::derive(&self.default_categories, &blogs);
        BlogDocument { blogs, categories }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.document).map_err(io::Error::from)?;
        self.storage.set_item(&self.key, &raw)
    }

    fn load_document(&mut self) {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<BlogDocument>(&raw) {
                Ok(document) => {
                    self.document = document;
                    self.corrupt = None;
                }
                Err(e) => {
                    // Left in place until a write, then copied under backup_key
                    error!("Stored document {} is corrupt, using example posts: {}", self.key, e);
                    self.document = self.seed_document();
                    self.corrupt = Some(raw);
                }
            },
            Ok(None) => {
                info!("No document stored under {}, seeding example posts", self.key);
                self.document = self.seed_document();
                if let Err(e) = self.persist() {
                    warn!("Error persisting example posts: {}", e);
                }
            }
            Err(e) => {
                error!("Error reading stored document {}, using example posts: {}", self.key, e);
                self.document = self.seed_document();
            }
        }
        self.loaded = true;
    }

    fn backup_corrupt(&mut self) -> Result<(), SaveError> {
        let Some(ref raw) = self.corrupt else {
            return Ok(());
        };

        let backup_key = self.backup_key();
        match self.storage.set_item(&backup_key, raw) {
            Ok(()) => {
                warn!("Corrupt document {} saved as {}", self.key, backup_key);
                self.corrupt = None;
                Ok(())
            }
            Err(e) => {
                error!("Error saving corrupt document {} as {}: {}", self.key, backup_key, e);
                Err(SaveError::Storage(format!("the stored posts are unreadable and could not be backed up: {}", e)))
            }
        }
    }
}

#[async_trait]
impl PostStore for LocalStore {
    async fn load(&mut self) -> Result<(), LoadError> {
        self.load_document();
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn loads_on_page_load(&self) -> bool {
        true
    }

    fn list(&self) -> Vec<Post> {
        self.document.blogs.clone()
    }

    fn display_order(&self) -> DisplayOrder {
        DisplayOrder::DateDescending
    }

    fn categories(&self) -> Vec<String> {
        self.document.categories.clone()
    }

    async fn get(&self, id: &PostId) -> Result<Post, LoadError> {
        self.document.blogs.iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(id.clone()))
    }

    async fn create(&mut self, draft: Draft) -> Result<Post, SaveError> {
        let write_lock = self.write_lock.clone();
        let _guard = write_lock.lock()
            .map_err(|_| SaveError::Storage("document lock poisoned".to_string()))?;

        // Another session may have written since this one loaded
        self.load_document();
        self.backup_corrupt()?;

        let id = PostId(Uuid::new_v4().to_string());
        let image = draft.image.as_ref()
            .filter(|image| !image.bytes.is_empty())
            .map(|image| image.to_data_url());
        let post = draft.into_post(id, image);

        // Not rolled back if persisting fails: the session keeps the post until the next load
        self.document.blogs.push(post.clone());
        if !post.category.is_empty() && !self.document.categories.contains(&post.category) {
            self.document.categories.push(post.category.clone());
        }

        match self.persist() {
            Ok(()) => {
                info!("Created post {} ({})", post.id, post.title);
                Ok(post)
            }
            Err(StorageError::QuotaExceeded { quota, needed }) => {
                warn!("Post {} not persisted, {} bytes needed with a quota of {}", post.id, needed, quota);
                Err(SaveError::QuotaExceeded)
            }
            Err(StorageError::Io(e)) => {
                error!("Error persisting post {}: {}", post.id, e);
                Err(SaveError::Storage(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::post::ImageUpload;
    use crate::store::document_storage::MemoryStorage;
    use crate::test_data::{default_categories, draft, STORED_DOCUMENT};

    use super::*;

    const KEY: &str = "blogData";

    fn open(storage: &Arc<MemoryStorage>) -> LocalStore {
        LocalStore::new(storage.clone(), KEY, default_categories())
    }

    #[tokio::test]
    async fn test_seeds_when_absent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        assert!(!store.is_loaded());
        store.load().await.unwrap();
        assert!(store.is_loaded());

        let posts = store.list();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, PostId::from("1"));
        assert!(!posts[1].id.as_str().is_empty());
        let categories = store.categories();
        for post in posts.iter() {
            assert!(categories.contains(&post.category));
        }

        // Seeding is persisted right away
        let raw = storage.get_item(KEY).unwrap().unwrap();
        let document: BlogDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(document.blogs, posts);
    }

    #[tokio::test]
    async fn test_loads_existing_document() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(KEY, STORED_DOCUMENT).unwrap();
        let mut store = open(&storage);
        store.load().await.unwrap();

        assert_eq!(store.list().len(), 3);
        assert_eq!(store.categories(), ["Technology", "Travel", "Food", "Lifestyle", "Music"]);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_kept() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(KEY, "{not json").unwrap();
        let mut store = open(&storage);
        store.load().await.unwrap();

        assert_eq!(store.list().len(), 2);
        assert_eq!(storage.get_item(KEY).unwrap().as_deref(), Some("{not json"));

        // The first write keeps a copy of what could not be read
        let created = store.create(draft("New", "2024-02-01", "Food")).await.unwrap();
        assert_eq!(storage.get_item(&store.backup_key()).unwrap().as_deref(), Some("{not json"));
        let raw = storage.get_item(KEY).unwrap().unwrap();
        let document: BlogDocument = serde_json::from_str(&raw).unwrap();
        assert!(document.blogs.contains(&created));
    }

    #[tokio::test]
    async fn test_interleaved_sessions_keep_both_posts() {
        let storage = Arc::new(MemoryStorage::new());
        let write_lock = Arc::new(Mutex::new(()));
        let mut first = open(&storage).with_write_lock(write_lock.clone());
        let mut second = open(&storage).with_write_lock(write_lock);
        first.load().await.unwrap();
        second.load().await.unwrap();

        let a = first.create(draft("From first", "2024-02-01", "Food")).await.unwrap();
        let b = second.create(draft("From second", "2024-02-02", "Food")).await.unwrap();

        let mut reopened = open(&storage);
        reopened.load().await.unwrap();
        assert_eq!(reopened.get(&a.id).await.unwrap(), a);
        assert_eq!(reopened.get(&b.id).await.unwrap(), b);
        assert_eq!(reopened.list().len(), 4);
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        store.load().await.unwrap();

        let created = store.create(draft("Newest", "2024-02-01", "Music")).await.unwrap();
        assert!(!created.id.as_str().is_empty());

        let mut posts = store.list();
        crate::text_utils::sort_by_date_desc(&mut posts);
        assert_eq!(posts[0], created);
        assert_eq!(posts.len(), 3);
        assert!(store.categories().contains(&"Music".to_string()));

        // A new session sees what was persisted
        let mut reopened = open(&storage);
        reopened.load().await.unwrap();
        assert_eq!(reopened.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_unique_ids() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        store.load().await.unwrap();

        let a = store.create(draft("A", "2024-02-01", "Food")).await.unwrap();
        let b = store.create(draft("B", "2024-02-01", "Food")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.categories().iter().filter(|c| c.as_str() == "Food").count(), 1);
    }

    #[tokio::test]
    async fn test_create_without_load() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        store.create(draft("Only", "2024-02-01", "Food")).await.unwrap();
        // Example posts were loaded first, not overwritten
        assert_eq!(store.list().len(), 3);
    }

    #[tokio::test]
    async fn test_get() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        store.load().await.unwrap();

        let created = store.create(draft("Exact", "2024-03-04", "Food")).await.unwrap();
        let found = store.get(&created.id).await.unwrap();
        assert_eq!(found.title, "Exact");
        assert_eq!(found.date, "2024-03-04");
        assert_eq!(found.category, "Food");
        assert_eq!(found.description, created.description);

        let missing = store.get(&PostId::from("missing")).await;
        assert!(matches!(missing, Err(LoadError::NotFound(id)) if id.as_str() == "missing"));
    }

    #[tokio::test]
    async fn test_image_stored_as_data_url() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);
        store.load().await.unwrap();

        let mut with_image = draft("Pic", "2024-02-01", "Food");
        with_image.image = Some(ImageUpload {
            file_name: "pic.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });
        let created = store.create(with_image).await.unwrap();
        assert_eq!(created.image.as_deref(), Some("data:image/png;base64,iVBORw=="));

        let mut empty_image = draft("NoPic", "2024-02-01", "Food");
        empty_image.image = Some(ImageUpload {
            file_name: "".to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes: vec![],
        });
        let created = store.create(empty_image).await.unwrap();
        assert!(created.image.is_none());
    }

    #[tokio::test]
    async fn test_quota_exceeded_keeps_post_in_session() {
        let storage = Arc::new(MemoryStorage::with_quota(2048));
        let mut store = open(&storage);
        store.load().await.unwrap();
        let persisted = storage.get_item(KEY).unwrap().unwrap();

        let mut big = draft("Big", "2024-02-01", "Food");
        big.image = Some(ImageUpload {
            file_name: "big.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![7u8; 4096],
        });
        let res = store.create(big).await;
        assert!(matches!(res, Err(SaveError::QuotaExceeded)));

        assert!(store.list().iter().any(|p| p.title == "Big"));
        assert_eq!(storage.get_item(KEY).unwrap(), Some(persisted));
    }
}
