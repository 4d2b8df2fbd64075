use std::io;

use spdlog::{debug, warn};

use crate::controller::{create, detail, listing, Container, PageOutcome, Session};
use crate::form::{CreateForm, FormError};
use crate::query_string::QueryString;
use crate::router::{default_nav_links, highlight_active_link, resolve, PageKind};
use crate::view::page_renderer::{render_nav, PageShell};
use crate::view::templates::Templates;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    Page {
        status: PageStatus,
        body: String,
    },
    Redirect(String),
    MethodNotAllowed,
}

/// Shell template of a page and the one container it accepts content for
fn shell_for(templates: &Templates, kind: PageKind) -> (&str, Option<Container>) {
    match kind {
        PageKind::Listing => (templates.index.as_str(), Some(Container::Grid)),
        PageKind::Create => (templates.create.as_str(), Some(Container::Form)),
        PageKind::Detail => (templates.detail.as_str(), Some(Container::Detail)),
        PageKind::Unknown => (templates.not_found.as_str(), None),
    }
}

fn assemble(templates: &Templates, kind: PageKind, site_title: &str, nav: &str, outcome: PageOutcome) -> io::Result<PageResponse> {
    let (shell_src, container) = shell_for(templates, kind);

    let (content, title) = match outcome {
        PageOutcome::Redirect(to) => return Ok(PageResponse::Redirect(to)),
        PageOutcome::Untouched => (None, None),
        PageOutcome::Rendered(rendered) if Some(rendered.container) == container => {
            (Some(rendered.html), rendered.document_title)
        }
        PageOutcome::Rendered(rendered) => {
            warn!("Page {:?} has no {:?} container, dropping fragment", kind, rendered.container);
            (None, None)
        }
    };

    let document_title = match title {
        Some(title) => format!("{} - {}", title, site_title),
        None => site_title.to_string(),
    };

    let shell = PageShell::new(shell_src)?;
    let body = shell.render(site_title, &document_title, nav, content.as_deref());
    let status = match kind {
        PageKind::Unknown => PageStatus::NotFound,
        _ => PageStatus::Ok,
    };
    Ok(PageResponse::Page { status, body })
}

fn navigation(templates: &Templates, path: &str) -> io::Result<String> {
    let mut links = default_nav_links();
    highlight_active_link(path, &mut links);
    render_nav(&templates.nav, &links)
}

/// One page load: resolve the page, open the session's store and run the
/// single controller owning that page.
pub async fn load_page(session: &mut Session, templates: &Templates, site_title: &str, path: &str, query: &QueryString) -> io::Result<PageResponse> {
    let kind = resolve(path);
    debug!("Loading {} as {:?}", path, kind);
    let nav = navigation(templates, path)?;

    session.begin_page_load().await;
    let outcome = match kind {
        PageKind::Listing => listing::render(session, templates).await?,
        PageKind::Create => create::render_form(session, templates).await?,
        PageKind::Detail => detail::render(session, templates, query).await?,
        PageKind::Unknown => PageOutcome::Untouched,
    };

    assemble(templates, kind, site_title, &nav, outcome)
}

/// Submission of the creation form. Only the create page accepts one.
pub async fn submit_page(session: &mut Session, templates: &Templates, site_title: &str, path: &str, form: Result<CreateForm, FormError>) -> io::Result<PageResponse> {
    let kind = resolve(path);
    if kind != PageKind::Create {
        return Ok(PageResponse::MethodNotAllowed);
    }
    let nav = navigation(templates, path)?;

    session.begin_page_load().await;
    let outcome = match form {
        Ok(form) => create::submit(session, templates, form).await?,
        Err(e) => {
            warn!("Unreadable form submission: {}", e);
            create::render_invalid(session, templates, &e.to_string()).await?
        }
    };

    assemble(templates, kind, site_title, &nav, outcome)
}
