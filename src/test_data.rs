use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::category;
use crate::post::{Draft, Post, PostId};
use crate::store::{DisplayOrder, LoadError, PostStore, SaveError};

pub const CONFIG_DATA: &str = r#"[site]
title = "Postboard"

[store]
mode = "local"
document_dir = "data"

[defaults]
categories = ["Technology", "Travel", "Food", "Lifestyle"]

[paths]
public_dir = "public"

[server]
address = "127.0.0.1"
port = 8001
"#;

pub const STORED_DOCUMENT: &str = r#"{
  "blogs": [
    {
      "id": "5b0c7a9e-1f0e-4d4b-9a43-0d5a8f1e2c11",
      "title": "Winter in Lisbon",
      "description": "Mild days.\nLong lunches.",
      "date": "2023-12-01",
      "category": "Travel",
      "image": null
    },
    {
      "id": "c2f3b1de-7a51-4c6a-8a0e-2f6c5b8d9e22",
      "title": "Records of the year",
      "description": "Ten albums I kept coming back to.",
      "date": "2024-01-20",
      "category": "Music"
    },
    {
      "id": "1",
      "title": "Getting Started with Web Development",
      "description": "Structure first, then style.",
      "date": "2023-06-30",
      "category": "Technology",
      "image": null
    }
  ],
  "categories": ["Technology", "Travel", "Food", "Lifestyle", "Music"]
}"#;

pub const EMPTY_DOCUMENT: &str = r#"{"blogs":[],"categories":["Technology","Travel","Food","Lifestyle"]}"#;

/// What a collection endpoint answers, including a document without any id
pub const REMOTE_COLLECTION: &str = r#"[
  {"id": 10, "title": "Numbered", "description": "From a numeric id", "date": "2024-01-02", "category": "Travel", "image": "/uploads/one.png"},
  {"_id": "abc123", "title": "Object id", "description": "From a document store", "date": "2023-11-30T10:00:00.000Z", "category": "Technology", "image": "https://cdn.example.com/two.jpg"},
  {"title": "No id", "description": "Dropped", "date": "2023-01-01", "category": "Ghost"},
  {"id": "3", "title": "Plain", "description": "", "date": "2022-05-05", "category": "Travel", "image": null}
]"#;

pub fn default_categories() -> Vec<String> {
    ["Technology", "Travel", "Food", "Lifestyle"].iter().map(|c| c.to_string()).collect()
}

pub fn draft(title: &str, date: &str, category: &str) -> Draft {
    Draft {
        title: title.to_string(),
        description: format!("About {}", title),
        date: date.to_string(),
        category: category.to_string(),
        image: None,
    }
}

#[derive(Default)]
pub struct FakeCalls {
    load: AtomicUsize,
    get: AtomicUsize,
    create: AtomicUsize,
}

impl FakeCalls {
    pub fn load(&self) -> usize {
        self.load.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn create(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.load() + self.get() + self.create()
    }
}

/// In-memory store that behaves like a remote one: backend order, loaded
/// only when a controller asks for it.
pub struct FakeStore {
    posts: Vec<Post>,
    loaded: bool,
    pub fail_load: bool,
    pub reject_create: Option<String>,
    pub calls: Arc<FakeCalls>,
}

impl FakeStore {
    /// Posts from `(id, date, category)`, titled `title <id>`
    pub fn with_posts(posts: Vec<(&str, &str, &str)>) -> Self {
        let posts = posts.into_iter()
            .map(|(id, date, category)| Post {
                id: PostId::from(id),
                title: format!("title {}", id),
                description: format!("description of {}", id),
                date: date.to_string(),
                category: category.to_string(),
                image: None,
            })
            .collect();

        FakeStore {
            posts,
            loaded: false,
            fail_load: false,
            reject_create: None,
            calls: Arc::new(FakeCalls::default()),
        }
    }
}

#[async_trait]
impl PostStore for FakeStore {
    async fn load(&mut self) -> Result<(), LoadError> {
        self.calls.load.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(LoadError::Unavailable("fake outage".to_string()));
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn loads_on_page_load(&self) -> bool {
        false
    }

    fn list(&self) -> Vec<Post> {
        self.posts.clone()
    }

    fn display_order(&self) -> DisplayOrder {
        DisplayOrder::Backend
    }

    fn categories(&self) -> Vec<String> {
        if self.loaded {
            category::derive(&[], &self.posts)
        } else {
            vec![]
        }
    }

    async fn get(&self, id: &PostId) -> Result<Post, LoadError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.posts.iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(id.clone()))
    }

    async fn create(&mut self, draft: Draft) -> Result<Post, SaveError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.reject_create {
            return Err(SaveError::Rejected(message.clone()));
        }
        let id = PostId(format!("fake-{}", self.posts.len() + 1));
        let post = draft.into_post(id, None);
        self.posts.push(post.clone());
        Ok(post)
    }
}
