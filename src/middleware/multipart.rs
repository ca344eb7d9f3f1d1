use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use std::collections::HashMap;

use crate::error::LinkHubError;
use crate::media::Upload;

/// A buffered `multipart/form-data` body: text fields plus file parts.
/// Empty file inputs (no file chosen in the browser) are dropped.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = LinkHubError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await.map_err(field_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(field_error)?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(field_error)?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }
}

fn rejection_error(e: MultipartRejection) -> LinkHubError {
    LinkHubError::Validation(e.body_text())
}

fn field_error(e: MultipartError) -> LinkHubError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LinkHubError::PayloadTooLarge
    } else {
        LinkHubError::Validation(e.body_text())
    }
}
