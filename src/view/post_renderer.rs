use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::text_utils::{format_content, format_date};
use crate::view::RenderMode;

#[derive(ramhorns::Content, Default)]
struct ViewItem {
    found: bool,
    title: String,
    category: String,
    date: String,
    content: String,
    has_image: bool,
    image: String,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
    pub mode: RenderMode,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str, mode: RenderMode) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
            mode,
        })
    }

    pub fn render(&self, post: &Post) -> String {
        let image = post.image.as_deref().unwrap_or("");
        self.template.render(&ViewItem {
            found: true,
            title: self.mode.text(&post.title).into_owned(),
            category: self.mode.text(&post.category).into_owned(),
            date: format_date(&post.date),
            content: format_content(&post.description, self.mode),
            has_image: !image.is_empty(),
            image: self.mode.text(image).into_owned(),
        })
    }

    pub fn render_not_found(&self) -> String {
        self.template.render(&ViewItem::default())
    }
}
