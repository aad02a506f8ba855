//! The type catalog: supported source types and reachable conversion targets.
//!
//! The catalog is static configuration, not computed state. Every conversion
//! request is checked against [`reachable_targets`] before any transformation
//! code runs, so unsupported (source, target) pairs never reach a codec. The
//! first reachable target of any source is always its identity representation.

/// Canonical content type of a stored fragment.
///
/// Parsed from the full MIME string supplied at creation; parameters such as
/// `charset=utf-8` are accepted and stripped. Anything that does not map to a
/// variant here is an unsupported source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `text/plain`
    Text,
    /// `text/html`
    Html,
    /// `text/markdown`
    Markdown,
    /// `text/csv`
    Csv,
    /// `application/json`
    Json,
    /// `application/yaml`
    Yaml,
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/webp`
    Webp,
    /// `image/gif`
    Gif,
    /// `image/avif`
    Avif,
}

impl ContentType {
    /// Parse a full MIME type string, optionally carrying parameters
    /// (`text/plain; charset=utf-8`). Returns `None` for unsupported or
    /// malformed types.
    pub fn parse(mime: &str) -> Option<Self> {
        let canonical = canonical_mime(mime)?;
        match canonical.as_str() {
            "text/plain" => Some(Self::Text),
            "text/html" => Some(Self::Html),
            "text/markdown" => Some(Self::Markdown),
            "text/csv" => Some(Self::Csv),
            "application/json" => Some(Self::Json),
            "application/yaml" => Some(Self::Yaml),
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// The canonical MIME string for this content type.
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Markdown => "text/markdown",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Avif => "image/avif",
        }
    }

    /// Whether this content type is textual (`text/*`).
    pub fn is_text(&self) -> bool {
        self.as_mime().starts_with("text/")
    }

    /// Whether this content type is a raster image (`image/*`).
    pub fn is_image(&self) -> bool {
        self.as_mime().starts_with("image/")
    }

    /// The target format that returns this type unchanged.
    pub fn identity_target(&self) -> TargetFormat {
        match self {
            Self::Text => TargetFormat::Txt,
            Self::Html => TargetFormat::Html,
            Self::Markdown => TargetFormat::Md,
            Self::Csv => TargetFormat::Csv,
            Self::Json => TargetFormat::Json,
            Self::Yaml => TargetFormat::Yaml,
            Self::Png => TargetFormat::Png,
            Self::Jpeg => TargetFormat::Jpg,
            Self::Webp => TargetFormat::Webp,
            Self::Gif => TargetFormat::Gif,
            Self::Avif => TargetFormat::Avif,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_mime())
    }
}

/// Target representation a fragment can be requested in, derived from the
/// extension on the request path (`/v1/fragments/{id}.{ext}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// `.txt` → `text/plain`
    Txt,
    /// `.md` → `text/markdown`
    Md,
    /// `.html` → `text/html`
    Html,
    /// `.csv` → `text/csv`
    Csv,
    /// `.json` → `application/json`
    Json,
    /// `.yaml` / `.yml` → `application/yaml`
    Yaml,
    /// `.png` → `image/png`
    Png,
    /// `.jpg` / `.jpeg` → `image/jpeg`
    Jpg,
    /// `.webp` → `image/webp`
    Webp,
    /// `.gif` → `image/gif`
    Gif,
    /// `.avif` → `image/avif`
    Avif,
}

impl TargetFormat {
    /// Map a file extension (without the dot) to a target format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Md),
            "html" => Some(Self::Html),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// The canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Avif => "avif",
        }
    }

    /// The MIME type of a response in this format.
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain",
            Self::Md => "text/markdown",
            Self::Html => "text/html",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Avif => "image/avif",
        }
    }
}

/// All raster targets, reachable from every raster source.
const RASTER_TARGETS: &[TargetFormat] = &[
    TargetFormat::Png,
    TargetFormat::Jpg,
    TargetFormat::Webp,
    TargetFormat::Gif,
    TargetFormat::Avif,
];

/// The ordered set of target formats reachable from a source type.
///
/// Identity comes first; the rest is the fixed conversion table. Requests for
/// a target not listed here are rejected by the conversion engine, never
/// silently coerced.
pub fn reachable_targets(source: ContentType) -> &'static [TargetFormat] {
    use TargetFormat::*;
    match source {
        ContentType::Text => &[Txt],
        ContentType::Html => &[Html, Txt],
        ContentType::Markdown => &[Md, Html, Txt],
        ContentType::Csv => &[Csv, Txt, Json],
        ContentType::Json => &[Json, Yaml, Txt],
        ContentType::Yaml => &[Yaml, Txt],
        ContentType::Png
        | ContentType::Jpeg
        | ContentType::Webp
        | ContentType::Gif
        | ContentType::Avif => RASTER_TARGETS,
    }
}

/// Whether `target` is reachable from `source`.
pub fn is_reachable(source: ContentType, target: TargetFormat) -> bool {
    reachable_targets(source).contains(&target)
}

/// Whether a MIME type string names a supported source type.
pub fn is_supported_source(mime: &str) -> bool {
    ContentType::parse(mime).is_some()
}

/// Strip parameters from a MIME string and lowercase the essence.
///
/// Returns `None` when the string has no `type/subtype` shape at all.
fn canonical_mime(mime: &str) -> Option<String> {
    let essence = mime.split(';').next()?.trim();
    let (ty, subty) = essence.split_once('/')?;
    if ty.is_empty() || subty.is_empty() || subty.contains('/') {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}
