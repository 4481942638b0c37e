use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;

use crate::error::AppError;

/// Wire format of a request or response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    /// Format of a request body. A missing content type means JSON; an
    /// unrecognised one is `None`.
    fn of_body(headers: &HeaderMap) -> Option<Format> {
        let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
            return Some(Format::Json);
        };
        media_format(&essence(content_type.to_str().ok()?))
    }

    /// The first format named in `Accept`, falling back to JSON.
    fn preferred(headers: &HeaderMap) -> Format {
        headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .find_map(|entry| match essence(entry).as_str() {
                "*/*" | "application/*" => Some(Format::Json),
                media => media_format(media),
            })
            .unwrap_or_default()
    }

    /// Wrap `value` for encoding in this format. `root` names the XML
    /// document element.
    pub fn respond<T>(self, root: &'static str, value: T) -> Negotiated<T> {
        Negotiated {
            format: self,
            root,
            value,
        }
    }
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn media_format(essence: &str) -> Option<Format> {
    match essence {
        "application/json" => Some(Format::Json),
        "application/xml" | "text/xml" => Some(Format::Xml),
        e if e.starts_with("application/") && e.ends_with("+json") => Some(Format::Json),
        e if e.starts_with("application/") && e.ends_with("+xml") => Some(Format::Xml),
        _ => None,
    }
}

/// The response format a client asked for through `Accept`.
impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Format::preferred(&parts.headers))
    }
}

/// A request body decoded from JSON or XML according to its content type.
///
/// Unlike `axum::Json`, a missing content type is accepted and every decode
/// failure is a plain 400, which is what clients of this API expect.
pub struct Decoded<T>(pub T);

impl<S, T> FromRequest<S> for Decoded<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Some(format) = Format::of_body(req.headers()) else {
            return Err(AppError::UnsupportedMediaType(
                "expected a JSON or XML body".to_string(),
            ));
        };

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(format!("unable to read body: {}", e.body_text())))?;

        let decoded = match format {
            Format::Json => serde_json::from_slice(&bytes).map_err(|e| e.to_string()),
            Format::Xml => std::str::from_utf8(&bytes)
                .map_err(|e| e.to_string())
                .and_then(|text| quick_xml::de::from_str(text).map_err(|e| e.to_string())),
        };
        decoded
            .map(Decoded)
            .map_err(|e| AppError::bad_request(format!("unable to parse body: {e}")))
    }
}

/// A response body encoded in the format the client asked for.
pub struct Negotiated<T> {
    format: Format,
    root: &'static str,
    value: T,
}

impl<T: Serialize> IntoResponse for Negotiated<T> {
    fn into_response(self) -> Response {
        match self.format {
            Format::Json => Json(self.value).into_response(),
            Format::Xml => match quick_xml::se::to_string_with_root(self.root, &self.value) {
                Ok(xml) => (
                    [(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"))],
                    xml,
                )
                    .into_response(),
                Err(e) => AppError::Encoding(e.to_string()).into_response(),
            },
        }
    }
}
