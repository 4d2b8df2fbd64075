use std::fmt;
use std::fmt::{Display, Formatter};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        PostId(value.to_string())
    }
}

/// One entry of the collection.
///
/// `date` is kept as received (`YYYY-MM-DD` or an RFC 3339 timestamp) so a value
/// that does not parse can still be shown. `image` is either a `data:` URL
/// (local documents) or a URL handed out by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, category={}\ntitle={}\ndescription:\n{}",
               self.id,
               self.date,
               self.category,
               self.title,
               self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Self-contained `data:` URL, so the image can live inside the persisted document
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }

    pub fn content_type_from_name(file_name: &str) -> &'static str {
        let ext = file_name.rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

/// Post data submitted by the user, not yet stored
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: String,
    pub image: Option<ImageUpload>,
}

impl Draft {
    pub fn into_post(self, id: PostId, image: Option<String>) -> Post {
        Post {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            category: self.category,
            image,
        }
    }
}

/// Content written to a fresh local document
pub fn seed_posts() -> Vec<Post> {
    vec![
        Post {
            id: PostId::from("1"),
            title: "Getting Started with Web Development".to_string(),
            description: "Web development is an exciting field that combines creativity with technical skills.\n\
                          Start with HTML for structure, then add CSS for style.\n\
                          Finally, JavaScript brings your pages to life.".to_string(),
            date: "2023-10-15".to_string(),
            category: "Technology".to_string(),
            image: None,
        },
        Post {
            id: PostId::from("2"),
            title: "Exploring the Mountains".to_string(),
            description: "There is nothing like the fresh air of the mountains.\n\
                          This trip took us through three valleys and two passes.\n\
                          Pack light, and always bring a jacket.".to_string(),
            date: "2023-10-10".to_string(),
            category: "Travel".to_string(),
            image: None,
        },
    ]
}
