use std::path::Path;

use mime::Mime;
use percent_encoding::percent_decode_str;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_FILE_NAME: &str = "image";
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file held in memory, ready to be posted as a message attachment.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a local file; the MIME type comes from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let mime_type = resolve_mime(None, &file_name);
        Ok(Self::new(file_name, mime_type, data))
    }

    /// Download a remote image. A well-formed Content-Type from the server wins over the extension.
    pub async fn fetch(http: &HttpClient, image_url: &str) -> Result<Self> {
        let url = Url::parse(image_url)?;
        let file_name = file_name_from_url(&url);
        log::debug!("GET {}", url);
        let resp = http.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(Error::ImageFetch {
                url: image_url.to_string(),
                status: resp.status(),
            });
        }
        let header_mime = resp.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let mime_type = resolve_mime(header_mime, &file_name);
        let data = resp.bytes().await?.to_vec();
        log::debug!("fetched attachment {} ({}, {} bytes)", file_name, mime_type, data.len());
        Ok(Self::new(file_name, mime_type, data))
    }

    /// Multipart body for the messages endpoint: a `content` text field and one `attachments[]` file part.
    ///
    /// A malformed `mime_type` is replaced by the type inferred from the file name.
    pub fn into_form(self, content: Option<&str>) -> Result<Form> {
        let mime_type = resolve_mime(Some(&self.mime_type), &self.file_name);
        let part = Part::bytes(self.data)
            .file_name(self.file_name)
            .mime_str(&mime_type)?;
        Ok(Form::new()
            .percent_encode_noop()
            .text("content", content.unwrap_or_default().to_string())
            .part("attachments[]", part))
    }
}

/// Last non-empty path segment of the URL, percent-decoded, or `"image"`.
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

/// `candidate` if it parses as a MIME type, else the extension lookup, else octet-stream.
pub fn resolve_mime(candidate: Option<&str>, file_name: &str) -> String {
    if let Some(value) = candidate.map(str::trim).filter(|v| !v.is_empty()) {
        match value.parse::<Mime>() {
            Ok(mime) => return mime.to_string(),
            Err(e) => log::debug!("ignoring content type {:?} for {}: {}", value, file_name, e),
        }
    }
    mime_from_extension(file_name).unwrap_or(FALLBACK_MIME).to_string()
}

pub fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime)
}
