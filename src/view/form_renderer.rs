use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::router::CREATE_PAGE;
use crate::view::RenderMode;

/// Values shown in the creation form, kept across a failed submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: String,
    pub custom_category: String,
}

#[derive(ramhorns::Content)]
struct FormPage {
    action: &'static str,
    has_alert: bool,
    alert: String,
    title: String,
    description: String,
    date: String,
    custom_category: String,
    categories: Vec<CategoryOption>,
}

#[derive(ramhorns::Content)]
struct CategoryOption {
    name: String,
    selected: bool,
}

pub struct FormRenderer<'a> {
    pub template: Template<'a>,
    pub mode: RenderMode,
}

impl FormRenderer<'_> {
    pub fn new(form_tpl_src: &str, mode: RenderMode) -> io::Result<FormRenderer> {
        let template = match Template::new(form_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing form template: {}", e)));
            }
        };

        Ok(FormRenderer {
            template,
            mode,
        })
    }

    pub fn render(&self, categories: &[String], values: &FormValues, alert: Option<&str>) -> String {
        let categories = categories.iter()
            .map(|name| CategoryOption {
                name: self.mode.text(name).into_owned(),
                selected: *name == values.category,
            })
            .collect();

        self.template.render(&FormPage {
            action: CREATE_PAGE,
            has_alert: alert.is_some(),
            alert: self.mode.text(alert.unwrap_or("")).into_owned(),
            title: self.mode.text(&values.title).into_owned(),
            description: self.mode.text(&values.description).into_owned(),
            date: self.mode.text(&values.date).into_owned(),
            custom_category: self.mode.text(&values.custom_category).into_owned(),
            categories,
        })
    }
}
