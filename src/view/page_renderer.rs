use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::router::NavLink;

#[derive(ramhorns::Content)]
struct NavPage<'a> {
    links: Vec<NavItem<'a>>,
}

#[derive(ramhorns::Content)]
struct NavItem<'a> {
    label: &'a str,
    href: &'a str,
    active: bool,
}

#[derive(ramhorns::Content)]
struct ShellPage<'a> {
    site_title: &'a str,
    document_title: &'a str,
    nav: &'a str,
    has_content: bool,
    content: &'a str,
}

fn compile<'a>(src: &'a str, what: &str) -> io::Result<Template<'a>> {
    Template::new(src)
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", what, e)))
}

pub fn render_nav(nav_tpl_src: &str, links: &[NavLink]) -> io::Result<String> {
    let template = compile(nav_tpl_src, "navigation")?;
    let links = links.iter()
        .map(|link| NavItem {
            label: link.label.as_str(),
            href: link.href.as_str(),
            active: link.active,
        })
        .collect();
    Ok(template.render(&NavPage { links }))
}

/// Static page skeleton. `content` fills its container; without it the
/// skeleton's own placeholder stays.
pub struct PageShell<'a> {
    pub template: Template<'a>,
}

impl PageShell<'_> {
    pub fn new(shell_tpl_src: &str) -> io::Result<PageShell> {
        Ok(PageShell {
            template: compile(shell_tpl_src, "page")?,
        })
    }

    pub fn render(&self, site_title: &str, document_title: &str, nav: &str, content: Option<&str>) -> String {
        self.template.render(&ShellPage {
            site_title,
            document_title,
            nav,
            has_content: content.is_some(),
            content: content.unwrap_or(""),
        })
    }
}
