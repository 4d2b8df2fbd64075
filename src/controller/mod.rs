use spdlog::warn;

use crate::category;
use crate::post::Post;
use crate::store::{DisplayOrder, LoadError, PostStore};
use crate::text_utils::sort_by_date_desc;
use crate::view::RenderMode;

pub mod create;
pub mod detail;
pub mod listing;

/// Element of a page skeleton a controller renders into
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Container {
    Grid,
    Form,
    Detail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub container: Container,
    pub html: String,
    pub document_title: Option<String>,
}

impl Rendered {
    pub fn new(container: Container, html: String) -> Self {
        Rendered {
            container,
            html,
            document_title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Rendered(Rendered),
    /// Nothing to render, the skeleton keeps its static content
    Untouched,
    Redirect(String),
}

/// State of one page load. Owns the store opened for it and is handed to
/// the controller the router picked.
pub struct Session {
    store: Box<dyn PostStore>,
    default_categories: Vec<String>,
    mode: RenderMode,
}

impl Session {
    pub fn new(store: Box<dyn PostStore>, default_categories: Vec<String>, mode: RenderMode) -> Self {
        Session {
            store,
            default_categories,
            mode,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn store(&self) -> &dyn PostStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn PostStore {
        self.store.as_mut()
    }

    /// Population done before any controller runs, for stores read synchronously
    pub async fn begin_page_load(&mut self) {
        if self.store.loads_on_page_load() && !self.store.is_loaded() {
            if let Err(e) = self.store.load().await {
                warn!("Error loading posts on page load: {}", e);
            }
        }
    }

    pub async fn ensure_loaded(&mut self) -> Result<(), LoadError> {
        if !self.store.is_loaded() {
            self.store.load().await?;
        }
        Ok(())
    }

    pub fn posts_for_display(&self) -> Vec<Post> {
        let mut posts = self.store.list();
        if self.store.display_order() == DisplayOrder::DateDescending {
            sort_by_date_desc(&mut posts);
        }
        posts
    }

    pub fn categories(&self) -> Vec<String> {
        let known = self.store.categories();
        category::merge(&self.default_categories, known.iter().map(|c| c.as_str()))
    }
}
