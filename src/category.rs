use crate::post::Post;

/// Working category set: `defaults` in their order, then every category found
/// in `extra` that was not seen yet, in first-seen order. Matching is exact and
/// case-sensitive.
pub fn merge<'a, I>(defaults: &'a [String], extra: I) -> Vec<String>
where
    I: IntoIterator<Item=&'a str>,
{
    let mut categories: Vec<String> = Vec::with_capacity(defaults.len());
    let defaults = defaults.iter().map(|c| c.as_str());
    for category in defaults.chain(extra) {
        if category.is_empty() {
            continue;
        }
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }
    categories
}

pub fn derive(defaults: &[String], posts: &[Post]) -> Vec<String> {
    merge(defaults, posts.iter().map(|p| p.category.as_str()))
}
