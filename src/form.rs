use bytes::Bytes;
use futures::stream;
use multer::Multipart;
use spdlog::debug;
use thiserror::Error;

use crate::post::ImageUpload;
use crate::view::form_renderer::FormValues;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Request is not multipart/form-data")]
    NotMultipart,
    #[error("Invalid form data: {0}")]
    Multipart(#[from] multer::Error),
}

/// Fields of a submitted creation form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateForm {
    pub values: FormValues,
    pub image: Option<ImageUpload>,
}

pub async fn parse_create_form(content_type: &str, body: Vec<u8>) -> Result<CreateForm, FormError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| FormError::NotMultipart)?;
    let body = stream::once(async move { Ok::<Bytes, std::io::Error>(Bytes::from(body)) });
    let mut multipart = Multipart::new(body, boundary);

    let mut form = CreateForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = match field.content_type() {
                Some(mime) => mime.to_string(),
                None => ImageUpload::content_type_from_name(&file_name).to_string(),
            };
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file is picked
            if !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "title" => form.values.title = value,
            "description" => form.values.description = value,
            "date" => form.values.date = value,
            "category" => form.values.category = value,
            "custom_category" => form.values.custom_category = value,
            _ => debug!("Ignoring form field {}", name),
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-POSTBOARD-BOUNDARY";

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    fn text_part(name: &str, value: &str) -> String {
        format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", BOUNDARY, name, value)
    }

    fn file_part(file_name: &str, content_type: Option<&str>, data: &str) -> String {
        let content_type = content_type
            .map(|ct| format!("Content-Type: {}\r\n", ct))
            .unwrap_or_default();
        format!("--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n{}\r\n{}\r\n",
                BOUNDARY, file_name, content_type, data)
    }

    fn body(parts: &[String]) -> Vec<u8> {
        let mut body = parts.concat();
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body.into_bytes()
    }

    #[tokio::test]
    async fn test_parse_all_fields() {
        let body = body(&[
            text_part("title", "Hello"),
            text_part("description", "First line\nSecond line"),
            text_part("date", "2024-02-01"),
            text_part("category", "Travel"),
            text_part("custom_category", "Music"),
            text_part("unknown", "ignored"),
            file_part("pic.png", Some("image/png"), "PNGDATA"),
        ]);

        let form = parse_create_form(&content_type(), body).await.unwrap();
        assert_eq!(form.values, FormValues {
            title: "Hello".to_string(),
            description: "First line\nSecond line".to_string(),
            date: "2024-02-01".to_string(),
            category: "Travel".to_string(),
            custom_category: "Music".to_string(),
        });
        let image = form.image.unwrap();
        assert_eq!(image.file_name, "pic.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"PNGDATA");
    }

    #[tokio::test]
    async fn test_empty_file_ignored() {
        let body = body(&[
            text_part("title", "No image"),
            file_part("", Some("application/octet-stream"), ""),
        ]);

        let form = parse_create_form(&content_type(), body).await.unwrap();
        assert_eq!(form.values.title, "No image");
        assert!(form.image.is_none());
    }

    #[tokio::test]
    async fn test_content_type_from_file_name() {
        let body = body(&[file_part("photo.JPG", None, "JPEGDATA")]);

        let form = parse_create_form(&content_type(), body).await.unwrap();
        assert_eq!(form.image.unwrap().content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_not_multipart() {
        let res = parse_create_form("application/x-www-form-urlencoded", b"title=x".to_vec()).await;
        assert!(matches!(res, Err(FormError::NotMultipart)));
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let body = format!("--{}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nHel", BOUNDARY);
        let res = parse_create_form(&content_type(), body.into_bytes()).await;
        assert!(matches!(res, Err(FormError::Multipart(_))));
    }
}
