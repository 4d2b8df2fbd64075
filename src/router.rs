pub const LISTING_PAGE: &str = "index.html";
pub const CREATE_PAGE: &str = "create.html";
pub const DETAIL_PAGE: &str = "blog.html";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageKind {
    Listing,
    Create,
    Detail,
    Unknown,
}

/// Last segment of a request path, without query or fragment
pub fn final_segment(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.rsplit('/').next().unwrap_or("")
}

pub fn resolve(path: &str) -> PageKind {
    match final_segment(path) {
        "" | LISTING_PAGE => PageKind::Listing,
        CREATE_PAGE => PageKind::Create,
        DETAIL_PAGE => PageKind::Detail,
        _ => PageKind::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

pub fn default_nav_links() -> Vec<NavLink> {
    [("Home", LISTING_PAGE), ("Create Post", CREATE_PAGE)]
        .into_iter()
        .map(|(label, href)| NavLink {
            label: label.to_string(),
            href: href.to_string(),
            active: false,
        })
        .collect()
}

/// Marks the link whose target is the current page. Runs for every page load,
/// whatever the dispatch outcome.
pub fn highlight_active_link(path: &str, links: &mut [NavLink]) {
    let current = match final_segment(path) {
        "" => LISTING_PAGE,
        segment => segment,
    };
    for link in links.iter_mut() {
        link.active = link.href == current;
    }
}
