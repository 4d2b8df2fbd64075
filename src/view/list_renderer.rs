use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::query_string::detail_query;
use crate::router::DETAIL_PAGE;
use crate::text_utils::{excerpt, format_date};
use crate::view::RenderMode;

const SUMMARY_CHARS: usize = 120;

#[derive(ramhorns::Content)]
struct ListPage {
    cards: Vec<PostCard>,
    empty: bool,
    has_error: bool,
    error: String,
}

#[derive(ramhorns::Content)]
struct PostCard {
    href: String,
    title: String,
    category: String,
    date: String,
    summary: String,
    has_image: bool,
    image: String,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
    pub mode: RenderMode,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str, mode: RenderMode) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
            mode,
        })
    }

    fn card(&self, post: &Post) -> PostCard {
        let image = post.image.as_deref().unwrap_or("");
        PostCard {
            href: format!("{}?{}", DETAIL_PAGE, detail_query(&post.id)),
            title: self.mode.text(&post.title).into_owned(),
            category: self.mode.text(&post.category).into_owned(),
            date: format_date(&post.date),
            summary: self.mode.text(&excerpt(&post.description, SUMMARY_CHARS)).into_owned(),
            has_image: !image.is_empty(),
            image: self.mode.text(image).into_owned(),
        }
    }

    /// One card per post, in the given order
    pub fn render(&self, posts: &[Post]) -> String {
        let cards: Vec<PostCard> = posts.iter().map(|post| self.card(post)).collect();
        self.template.render(&ListPage {
            empty: cards.is_empty(),
            cards,
            has_error: false,
            error: String::new(),
        })
    }

    pub fn render_error(&self, message: &str) -> String {
        self.template.render(&ListPage {
            cards: vec![],
            empty: false,
            has_error: true,
            error: message.to_string(),
        })
    }
}
