use std::collections::HashMap;

use crate::post::PostId;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn from_opt(buf: Option<&str>) -> Self {
        Self::from(buf.unwrap_or(""))
    }

    /// The `id` parameter of the detail page, taken as sent. Empty counts as absent.
    pub fn get_id(&self) -> Option<PostId> {
        self.items.get("id")
            .filter(|id| !id.is_empty())
            .map(|id| PostId::from(id.as_str()))
    }
}

/// Query string pointing the detail page at `id`
pub fn detail_query(id: &PostId) -> String {
    serde_urlencoded::to_string([("id", id.as_str())]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_id() {
        assert_eq!(QueryString::from("id=42").get_id(), Some(PostId::from("42")));
        assert_eq!(QueryString::from("x=1&id=a%20b").get_id(), Some(PostId::from("a b")));
        assert_eq!(QueryString::from("id=").get_id(), None);
        assert_eq!(QueryString::from("other=1").get_id(), None);
        assert_eq!(QueryString::from_opt(None).get_id(), None);
        // Ids are matched exactly, surrounding spaces included
        assert_eq!(QueryString::from("id=%201").get_id(), Some(PostId::from(" 1")));
    }

    #[test]
    fn test_detail_query() {
        assert_eq!(detail_query(&PostId::from("1")), "id=1");
        let query = detail_query(&PostId::from("a&b c"));
        assert_eq!(query, "id=a%26b+c");
        assert_eq!(QueryString::from(&query).get_id(), Some(PostId::from("a&b c")));
    }

    #[test]
    fn test_parse_query_str() {
        let buf = "bread=baguette&cheese=comt%C3%A9";
        let meal = vec![
            ("bread".to_owned(), "baguette".to_owned()),
            ("cheese".to_owned(), "comté".to_owned()),
        ].into_iter().collect::<HashMap<_, _>>();

        assert_eq!(QueryString::from(buf), QueryString { items: meal });
    }

    #[test]
    fn test_parse_invalid_query_str() {
        let expected = QueryString {
            items: Default::default(),
        };
        assert_eq!(QueryString::from(""), expected);
    }
}
