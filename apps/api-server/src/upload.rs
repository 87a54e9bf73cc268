//! Multipart form decoding for the post endpoints.
//!
//! Create and update both accept `multipart/form-data` with text fields and
//! an optional image part. Unknown fields are skipped; the image is format-
//! gated (JPEG/PNG) before any bytes are buffered past the size cap.

use actix_multipart::{Field, Multipart};
use futures::TryStreamExt;

use gazette_core::error::FieldViolation;
use gazette_core::ports::ImageFormat;

use crate::middleware::error::AppError;

/// An accepted image upload, not yet written to storage.
pub struct UploadedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Raw decoded form. Every member is optional at this level; the domain
/// draft/patch validation decides what is required.
#[derive(Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<UploadedImage>,
}

/// Drain a multipart payload into a [`PostForm`].
///
/// `tags` may be sent as repeated fields or as one comma-separated value;
/// both decode to a list of trimmed, non-empty strings.
pub async fn read_post_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => form.title = Some(read_text(&mut field).await?),
            "content" => form.content = Some(read_text(&mut field).await?),
            "category" => form.category = Some(read_text(&mut field).await?),
            "tags" => {
                let value = read_text(&mut field).await?;
                let tags = form.tags.get_or_insert_with(Vec::new);
                tags.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from),
                );
            }
            "image" => form.image = Some(read_image(&mut field, max_image_bytes).await?),
            // Skip unknown fields
            _ => continue,
        }
    }

    Ok(form)
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8(buf)
        .map_err(|_| AppError::BadRequest("form field is not valid UTF-8".to_string()))
}

async fn read_image(field: &mut Field, max_image_bytes: usize) -> Result<UploadedImage, AppError> {
    // Both the declared content type and the filename extension must be an
    // accepted image format; the content type decides which one.
    let mime_format = field
        .content_type()
        .and_then(|m| ImageFormat::from_mime(m.essence_str()));
    let name_format = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(ImageFormat::from_filename);

    let format = match (mime_format, name_format) {
        (Some(format), Some(_)) => format,
        _ => {
            return Err(AppError::Validation(vec![FieldViolation::new(
                "image",
                "image must be a JPEG or PNG file",
            )]));
        }
    };

    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if bytes.len() + chunk.len() > max_image_bytes {
            return Err(AppError::BadRequest(
                "image exceeds the upload size limit".to_string(),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadedImage { format, bytes })
}

fn bad_multipart(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("malformed multipart payload: {err}"))
}
