use std::io;

use chrono::Local;
use spdlog::{info, warn};

use crate::controller::{Container, PageOutcome, Rendered, Session};
use crate::form::CreateForm;
use crate::post::Draft;
use crate::router::LISTING_PAGE;
use crate::view::form_renderer::{FormRenderer, FormValues};
use crate::view::templates::Templates;

/// The free-text category wins over the selected one when it has any content
pub fn choose_category(selected: &str, custom: &str) -> String {
    let custom = custom.trim();
    if custom.is_empty() {
        selected.to_string()
    } else {
        custom.to_string()
    }
}

async fn categories(session: &mut Session) -> Vec<String> {
    // Without posts the selector still offers the defaults
    if let Err(e) = session.ensure_loaded().await {
        warn!("Error loading categories for the form: {}", e);
    }
    session.categories()
}

fn render_with(session: &Session, templates: &Templates, categories: &[String], values: &FormValues, alert: Option<&str>) -> io::Result<PageOutcome> {
    let renderer = FormRenderer::new(&templates.post_form, session.mode())?;
    let html = renderer.render(categories, values, alert);
    Ok(PageOutcome::Rendered(Rendered::new(Container::Form, html)))
}

fn blank_values(categories: &[String]) -> FormValues {
    FormValues {
        date: Local::now().format("%Y-%m-%d").to_string(),
        category: categories.first().cloned().unwrap_or_default(),
        ..Default::default()
    }
}

pub async fn render_form(session: &mut Session, templates: &Templates) -> io::Result<PageOutcome> {
    let categories = categories(session).await;
    let values = blank_values(&categories);
    render_with(session, templates, &categories, &values, None)
}

/// Empty form with an alert, for submissions that could not be read at all
pub async fn render_invalid(session: &mut Session, templates: &Templates, alert: &str) -> io::Result<PageOutcome> {
    let categories = categories(session).await;
    let values = blank_values(&categories);
    render_with(session, templates, &categories, &values, Some(alert))
}

pub async fn submit(session: &mut Session, templates: &Templates, form: CreateForm) -> io::Result<PageOutcome> {
    let CreateForm { values, image } = form;
    let draft = Draft {
        title: values.title.clone(),
        description: values.description.clone(),
        date: values.date.clone(),
        category: choose_category(&values.category, &values.custom_category),
        image,
    };

    match session.store_mut().create(draft).await {
        Ok(post) => {
            info!("Post {} published", post.id);
            Ok(PageOutcome::Redirect(LISTING_PAGE.to_string()))
        }
        Err(e) => {
            warn!("Error publishing post {}: {}", values.title, e);
            let categories = categories(session).await;
            render_with(session, templates, &categories, &values, Some(&e.to_string()))
        }
    }
}
