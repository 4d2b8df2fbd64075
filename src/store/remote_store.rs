use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use spdlog::{debug, info, warn};

use crate::category;
use crate::post::{Draft, ImageUpload, Post, PostId};
use crate::store::{DisplayOrder, LoadError, PostStore, SaveError};

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentId {
    Text(String),
    Number(i64),
}

impl DocumentId {
    fn into_string(self) -> String {
        match self {
            DocumentId::Text(s) => s,
            DocumentId::Number(n) => n.to_string(),
        }
    }
}

/// A post as the collection endpoint sends it
#[derive(Deserialize)]
struct PostDocument {
    id: Option<DocumentId>,
    #[serde(rename = "_id")]
    object_id: Option<DocumentId>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDocument {
    message: String,
}

/// Posts held by a remote collection endpoint. The endpoint owns ids and
/// ordering; this store only keeps what the last `load` returned.
pub struct RemoteStore {
    client: Client,
    endpoint: Url,
    posts: Option<Vec<Post>>,
}

impl RemoteStore {
    pub fn new(client: Client, endpoint: Url) -> Self {
        RemoteStore {
            client,
            endpoint,
            posts: None,
        }
    }

    fn item_url(&self, id: &PostId) -> Option<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut().ok()?
            .pop_if_empty()
            .push(id.as_str());
        Some(url)
    }

    fn resolve_image(&self, image: Option<String>) -> Option<String> {
        let image = image.filter(|s| !s.trim().is_empty())?;
        match self.endpoint.join(&image) {
            Ok(url) => Some(url.to_string()),
            Err(_) => Some(image),
        }
    }

    fn to_post(&self, doc: PostDocument) -> Option<Post> {
        let id = doc.id.or(doc.object_id)?.into_string();
        if id.is_empty() {
            return None;
        }
        Some(Post {
            id: PostId(id),
            title: doc.title,
            description: doc.description,
            date: doc.date,
            category: doc.category,
            image: self.resolve_image(doc.image),
        })
    }

    fn image_part(image: ImageUpload) -> Part {
        let ImageUpload { file_name, content_type, bytes } = image;
        match Part::bytes(bytes.clone()).file_name(file_name.clone()).mime_str(&content_type) {
            Ok(part) => part,
            Err(e) => {
                warn!("Ignoring content type {} of {}: {}", content_type, file_name, e);
                Part::bytes(bytes).file_name(file_name)
            }
        }
    }

    fn draft_form(draft: Draft) -> Form {
        let form = Form::new()
            .text("title", draft.title)
            .text("description", draft.description)
            .text("date", draft.date)
            .text("category", draft.category);

        match draft.image.filter(|image| !image.bytes.is_empty()) {
            Some(image) => form.part("image", Self::image_part(image)),
            None => form,
        }
    }
}

#[async_trait]
impl PostStore for RemoteStore {
    async fn load(&mut self) -> Result<(), LoadError> {
        let response = self.client.get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Unavailable(format!("{} answered {}", self.endpoint, status)));
        }

        let docs: Vec<PostDocument> = response.json()
            .await
            .map_err(|e| LoadError::Unavailable(format!("Invalid post collection: {}", e)))?;

        let total = docs.len();
        let posts: Vec<Post> = docs.into_iter()
            .filter_map(|doc| self.to_post(doc))
            .collect();
        if posts.len() != total {
            warn!("Skipped {} posts without id from {}", total - posts.len(), self.endpoint);
        }

        debug!("Loaded {} posts from {}", posts.len(), self.endpoint);
        self.posts = Some(posts);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.posts.is_some()
    }

    fn loads_on_page_load(&self) -> bool {
        false
    }

    fn list(&self) -> Vec<Post> {
        self.posts.clone().unwrap_or_default()
    }

    fn display_order(&self) -> DisplayOrder {
        DisplayOrder::Backend
    }

    fn categories(&self) -> Vec<String> {
        match self.posts {
            Some(ref posts) => category::derive(&[], posts),
            None => vec![],
        }
    }

    async fn get(&self, id: &PostId) -> Result<Post, LoadError> {
        let url = self.item_url(id)
            .ok_or_else(|| LoadError::Unavailable(format!("Cannot build post url from {}", self.endpoint)))?;

        let response = self.client.get(url)
            .send()
            .await
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LoadError::NotFound(id.clone()));
        }

        let doc: PostDocument = response.json()
            .await
            .map_err(|e| LoadError::Unavailable(format!("Invalid post {}: {}", id, e)))?;

        self.to_post(doc).ok_or_else(|| LoadError::NotFound(id.clone()))
    }

    async fn create(&mut self, draft: Draft) -> Result<Post, SaveError> {
        let response = self.client.post(self.endpoint.clone())
            .multipart(Self::draft_form(draft))
            .send()
            .await
            .map_err(|e| SaveError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text()
            .await
            .map_err(|e| SaveError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorDocument>(&body) {
                Ok(err) => err.message,
                Err(_) => format!("Request failed with status {}", status),
            };
            warn!("Post rejected by {}: {}", self.endpoint, message);
            return Err(SaveError::Rejected(message));
        }

        let post = serde_json::from_str::<PostDocument>(&body)
            .ok()
            .and_then(|doc| self.to_post(doc))
            .ok_or_else(|| SaveError::Rejected("The post service returned an invalid post".to_string()))?;

        info!("Created post {} ({})", post.id, post.title);
        if let Some(ref mut posts) = self.posts {
            posts.push(post.clone());
        }
        Ok(post)
    }
}
