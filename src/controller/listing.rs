use std::io;

use spdlog::warn;

use crate::controller::{Container, PageOutcome, Rendered, Session};
use crate::view::list_renderer::ListRenderer;
use crate::view::templates::Templates;

pub const LOAD_ERROR_MESSAGE: &str = "Could not load posts. Please try again later.";

pub async fn render(session: &mut Session, templates: &Templates) -> io::Result<PageOutcome> {
    let renderer = ListRenderer::new(&templates.post_list, session.mode())?;

    let html = match session.ensure_loaded().await {
        Ok(()) => renderer.render(&session.posts_for_display()),
        Err(e) => {
            warn!("Error loading post list: {}", e);
            renderer.render_error(LOAD_ERROR_MESSAGE)
        }
    };

    Ok(PageOutcome::Rendered(Rendered::new(Container::Grid, html)))
}
