//! Form parameter extraction from recorded request bodies

mod multipart;
mod upload;
mod urlencoded;

pub use upload::{UploadStore, FALLBACK_UPLOAD_NAME};

use bytes::Bytes;
use mime::Mime;
use tracing::{debug, warn};

use crate::message::CapturedRequest;
use crate::{RecorderError, Result};

/// Value of a submitted form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text value
    Literal(String),
    /// File upload, saved under the given name in the upload directory
    Upload(String),
}

/// A single submitted form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Field name
    pub name: String,
    /// Field value
    pub value: ParamValue,
}

impl Param {
    /// Create a literal parameter
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParamValue::Literal(value.into()),
        }
    }

    /// Create an upload parameter
    pub fn upload(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParamValue::Upload(filename.into()),
        }
    }
}

/// A decoded form field before upload handling
#[derive(Debug, Clone)]
pub(crate) struct FormField {
    pub name: String,
    pub value: Bytes,
    /// Present (possibly empty) for file upload parts
    pub filename: Option<String>,
}

/// Extract form parameters from a request body
///
/// Field names keep the order of their first appearance in the body, and
/// repeated names list all their values together. Uploaded files
/// are written to `uploads` the first time their name is seen.
///
/// # Errors
///
/// Returns error if the `Content-Type` header is missing, the
/// `Content-Length` header is invalid, or the body cannot be decoded
pub fn extract_params(request: &CapturedRequest, uploads: &UploadStore) -> Result<Vec<Param>> {
    let content_type = request
        .header("content-type")
        .ok_or_else(|| RecorderError::MissingHeader {
            header: "content-type",
            url: request.url().to_string(),
        })?;
    let media_type: Mime = content_type.trim().parse().map_err(|e| {
        RecorderError::MalformedHeader(format!("content-type {content_type:?}: {e}"))
    })?;

    let body = declared_body(request)?;

    let fields = if media_type.type_() == mime::APPLICATION
        && media_type.subtype() == mime::WWW_FORM_URLENCODED
    {
        urlencoded::parse(&body)
    } else if media_type.type_() == mime::MULTIPART {
        let boundary = media_type.get_param(mime::BOUNDARY).ok_or_else(|| {
            RecorderError::MalformedBody(format!("no multipart boundary for {}", request.url()))
        })?;
        multipart::parse(&body, boundary.as_str())?
    } else {
        warn!(
            "Unsupported content type {} for {}, no params extracted",
            media_type.essence_str(),
            request.url()
        );
        return Ok(Vec::new());
    };

    debug!("Extracted {} form fields from {}", fields.len(), request.url());

    group_by_name(fields)
        .into_iter()
        .map(|field| match field.filename {
            None => Ok(Param::literal(
                field.name,
                String::from_utf8_lossy(&field.value),
            )),
            Some(filename) => {
                let saved = uploads.save(&filename, &field.value)?;
                Ok(Param::upload(field.name, saved))
            }
        })
        .collect()
}

/// Gather the values of each field name, names in first-appearance order
///
/// `b=2&a=1&b=3` gives `b=2`, `b=3`, `a=1`.
fn group_by_name(fields: Vec<FormField>) -> Vec<FormField> {
    let mut groups: Vec<(String, Vec<FormField>)> = Vec::new();
    for field in fields {
        match groups.iter_mut().find(|(name, _)| *name == field.name) {
            Some((_, values)) => values.push(field),
            None => groups.push((field.name.clone(), vec![field])),
        }
    }
    groups.into_iter().flat_map(|(_, values)| values).collect()
}

/// Request body cut to the declared `Content-Length`, if any
fn declared_body(request: &CapturedRequest) -> Result<Bytes> {
    let body = request.body().clone();
    let Some(length) = request.header("content-length") else {
        return Ok(body);
    };

    let length: usize = length.trim().parse().map_err(|_| {
        RecorderError::MalformedHeader(format!("content-length {length:?}"))
    })?;
    Ok(body.slice(..length.min(body.len())))
}
