use std::io;

use spdlog::warn;

use crate::controller::{Container, PageOutcome, Rendered, Session};
use crate::query_string::QueryString;
use crate::view::post_renderer::PostRenderer;
use crate::view::templates::Templates;

pub const NOT_FOUND_TITLE: &str = "Post not found";

pub async fn render(session: &mut Session, templates: &Templates, query: &QueryString) -> io::Result<PageOutcome> {
    let Some(id) = query.get_id() else {
        return Ok(PageOutcome::Untouched);
    };

    let renderer = PostRenderer::new(&templates.post_view, session.mode())?;
    let rendered = match session.store().get(&id).await {
        Ok(post) => Rendered {
            container: Container::Detail,
            html: renderer.render(&post),
            document_title: Some(post.title),
        },
        Err(e) => {
            warn!("Error opening post {}: {}", id, e);
            Rendered {
                container: Container::Detail,
                html: renderer.render_not_found(),
                document_title: Some(NOT_FOUND_TITLE.to_string()),
            }
        }
    };

    Ok(PageOutcome::Rendered(rendered))
}
