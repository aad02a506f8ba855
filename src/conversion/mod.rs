//! The conversion engine: transcoding a stored representation into a
//! requested target format.
//!
//! Reachability is checked against the type catalog before any transformation
//! runs, so an unsupported (source, target) pair never reaches codec code and
//! always surfaces as [`Error::UnsupportedConversion`]. A decode failure on a
//! *reachable* path is a different animal (the pair was legal, the payload
//! was not) and surfaces as [`Error::ConversionFailed`].
//!
//! Every transform is a stateless, reentrant pure function; the engine holds
//! no per-call data and requires no synchronization.

pub mod image;
pub mod structured;
pub mod text;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::model::catalog::{self, ContentType, TargetFormat};

/// Result of a conversion: the transcoded bytes and their MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub bytes: Bytes,
    pub mime_type: &'static str,
}

impl Converted {
    fn new(bytes: impl Into<Bytes>, mime_type: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }
}

/// Convert `data` of type `source` into the `target` format.
///
/// Identity requests return the bytes unchanged, with two deliberate
/// exceptions: JSON→JSON and YAML→YAML re-serialize canonically, so
/// re-requesting those formats returns a deterministic reformatting rather
/// than the raw original bytes.
pub fn convert(source: ContentType, target: TargetFormat, data: &[u8]) -> Result<Converted> {
    if !catalog::is_reachable(source, target) {
        return Err(Error::UnsupportedConversion {
            from: source.as_mime().to_string(),
            to: target.extension().to_string(),
        });
    }

    match (source, target) {
        // Canonicalizing identities: parse then re-emit deterministically.
        (ContentType::Json, TargetFormat::Json) => {
            Ok(Converted::new(structured::json_pretty(data)?, "application/json"))
        }
        (ContentType::Yaml, TargetFormat::Yaml) => {
            Ok(Converted::new(structured::yaml_canonical(data)?, "application/yaml"))
        }

        // Text renderings.
        (ContentType::Markdown, TargetFormat::Html) => {
            Ok(Converted::new(text::markdown_to_html(as_utf8(data)?), "text/html"))
        }
        (ContentType::Markdown, TargetFormat::Txt) => {
            Ok(Converted::new(text::markdown_to_plain(as_utf8(data)?), "text/plain"))
        }
        (ContentType::Html, TargetFormat::Txt) => {
            Ok(Converted::new(text::strip_tags(as_utf8(data)?), "text/plain"))
        }

        // Structured data.
        (ContentType::Json, TargetFormat::Txt) => {
            Ok(Converted::new(structured::json_pretty(data)?, "text/plain"))
        }
        (ContentType::Json, TargetFormat::Yaml) => {
            Ok(Converted::new(structured::json_to_yaml(data)?, "application/yaml"))
        }
        (ContentType::Csv, TargetFormat::Json) => {
            Ok(Converted::new(structured::csv_to_json(data)?, "application/json"))
        }

        // CSV and YAML are already valid plain text.
        (ContentType::Csv, TargetFormat::Txt) | (ContentType::Yaml, TargetFormat::Txt) => {
            Ok(Converted::new(data.to_vec(), "text/plain"))
        }

        // Raster re-encoding; identity image requests pass through untouched.
        (s, t) if s.is_image() => {
            if s.identity_target() == t {
                Ok(Converted::new(data.to_vec(), s.as_mime()))
            } else {
                Ok(Converted::new(image::transcode(t, data)?, t.as_mime()))
            }
        }

        // Remaining identities (text/plain, html, markdown, csv) pass
        // through unchanged.
        (s, t) if s.identity_target() == t => Ok(Converted::new(data.to_vec(), s.as_mime())),

        // Unreachable: the catalog check above rejects every other pair.
        (s, t) => Err(Error::UnsupportedConversion {
            from: s.as_mime().to_string(),
            to: t.extension().to_string(),
        }),
    }
}

/// Decode a textual payload, classifying bad UTF-8 as a conversion failure.
fn as_utf8(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data)
        .map_err(|_| Error::conversion_failed("payload is not valid UTF-8"))
}
