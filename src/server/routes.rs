//! Fragment route handlers.
//!
//! Routes mirror the fragment lifecycle: POST creates, GET reads (raw,
//! converted via an extension suffix, or metadata via `/info`), PUT replaces,
//! DELETE removes. Success bodies share the `{"status": "ok", ...}` envelope;
//! raw and converted reads return the payload bytes directly.

use axum::extract::{Extension, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::conversion;
use crate::error::Error;
use crate::ids::{FragmentId, OwnerId};
use crate::model::{Fragment, TargetFormat};
use crate::service::Listing;

use super::error::AppError;
use super::AppContext;

/// Fragment metadata as served over the wire.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FragmentDto {
    pub id: String,
    pub owner_id: String,
    pub created: String,
    pub updated: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub version: u64,
}

impl FragmentDto {
    fn from_model(fragment: &Fragment) -> Self {
        Self {
            id: fragment.id().to_string(),
            owner_id: fragment.owner_id().to_string(),
            created: fragment.created().to_rfc3339(),
            updated: fragment.updated().to_rfc3339(),
            content_type: fragment.type_str().to_string(),
            size: fragment.size(),
            version: fragment.version(),
        }
    }
}

/// Query parameters for listing fragments.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    /// `expand=1` returns full metadata records instead of bare IDs.
    pub expand: Option<u8>,
}

/// POST /v1/fragments
#[utoipa::path(
    post,
    path = "/v1/fragments",
    request_body(content = Vec<u8>, description = "Raw fragment payload"),
    responses(
        (status = 201, description = "Fragment created", body = FragmentDto),
        (status = 415, description = "Unsupported fragment type"),
        (status = 500, description = "Storage fault")
    )
)]
pub async fn create_fragment(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = declared_type(&headers)?;
    let fragment = ctx.service.create(owner, &content_type, body).await?;

    let location = location_for(&ctx, &headers, fragment.id());
    let etag = format!("\"{}\"", fragment.version());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location), (header::ETAG, etag)],
        Json(json!({ "status": "ok", "fragment": FragmentDto::from_model(&fragment) })),
    ))
}

/// GET /v1/fragments
#[utoipa::path(
    get,
    path = "/v1/fragments",
    params(ListParams),
    responses(
        (status = 200, description = "Fragment listing for the current owner")
    )
)]
pub async fn list_fragments(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let expand = params.expand == Some(1);
    let fragments = match ctx.service.list(&owner, expand).await? {
        Listing::Ids(ids) => json!(ids.iter().map(ToString::to_string).collect::<Vec<_>>()),
        Listing::Full(records) => {
            json!(records.iter().map(FragmentDto::from_model).collect::<Vec<_>>())
        }
    };
    Ok(Json(json!({ "status": "ok", "fragments": fragments })))
}

/// GET /v1/fragments/{id}
///
/// The `id` segment may carry an extension (`{id}.{ext}`), in which case the
/// payload is transcoded to the representation the extension names.
#[utoipa::path(
    get,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment ID, optionally with a target extension")),
    responses(
        (status = 200, description = "Fragment payload (raw or transcoded)"),
        (status = 404, description = "Fragment not found"),
        (status = 415, description = "Target representation unreachable from the stored type"),
        (status = 500, description = "Conversion failed")
    )
)]
pub async fn get_fragment(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    Path(id_param): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (id, extension) = split_id_param(&id_param)?;
    let (fragment, data) = ctx.service.get_data(&owner, id).await?;

    match extension {
        None => {
            // Identity: serve the stored representation unchanged.
            let etag = format!("\"{}\"", fragment.version());
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, fragment.type_str().to_string()),
                    (header::ETAG, etag),
                ],
                data,
            )
                .into_response())
        }
        Some(ext) => {
            let target = TargetFormat::from_extension(ext).ok_or_else(|| {
                Error::UnsupportedConversion {
                    from: fragment.mime_type().to_string(),
                    to: ext.to_string(),
                }
            })?;
            let converted = conversion::convert(fragment.content_type(), target, &data)?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, converted.mime_type.to_string())],
                converted.bytes,
            )
                .into_response())
        }
    }
}

/// GET /v1/fragments/{id}/info
#[utoipa::path(
    get,
    path = "/v1/fragments/{id}/info",
    params(("id" = String, Path, description = "Fragment ID")),
    responses(
        (status = 200, description = "Fragment metadata", body = FragmentDto),
        (status = 404, description = "Fragment not found")
    )
)]
pub async fn get_fragment_info(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    Path(id_param): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_param)?;
    let fragment = ctx.service.get(&owner, id).await?;
    Ok(Json(json!({ "status": "ok", "fragment": FragmentDto::from_model(&fragment) })))
}

/// PUT /v1/fragments/{id}
#[utoipa::path(
    put,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment ID")),
    request_body(content = Vec<u8>, description = "Replacement payload"),
    responses(
        (status = 200, description = "Fragment replaced", body = FragmentDto),
        (status = 400, description = "Declared type differs from the stored type"),
        (status = 404, description = "Fragment not found"),
        (status = 409, description = "Stale If-Match version")
    )
)]
pub async fn put_fragment(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    Path(id_param): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_param)?;
    let declared = declared_type(&headers)?;
    let expected_version = if_match_version(&headers)?;

    let fragment = ctx
        .service
        .replace(&owner, id, body, &declared, expected_version)
        .await?;

    let etag = format!("\"{}\"", fragment.version());
    Ok((
        [(header::ETAG, etag)],
        Json(json!({ "status": "ok", "fragment": FragmentDto::from_model(&fragment) })),
    ))
}

/// DELETE /v1/fragments/{id}
#[utoipa::path(
    delete,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment ID")),
    responses(
        (status = 200, description = "Fragment deleted"),
        (status = 404, description = "Fragment not found")
    )
)]
pub async fn delete_fragment(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<OwnerId>,
    Path(id_param): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_param)?;
    ctx.service.delete(&owner, id).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// The declared content type of the request body.
fn declared_type(headers: &HeaderMap) -> Result<String, Error> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or_else(|| Error::UnsupportedType("missing Content-Type header".to_string()))
}

/// The expected fragment version from an `If-Match` header, when present.
fn if_match_version(headers: &HeaderMap) -> Result<Option<u64>, Error> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .map(|v| v.trim().trim_matches('"'))
        .and_then(|v| v.parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| Error::validation("If-Match must carry a fragment version"))
}

/// Parse a bare fragment ID path segment.
///
/// An unparseable ID cannot name any fragment the owner has, so it reads as
/// not-found rather than a validation failure.
fn parse_id(param: &str) -> Result<FragmentId, Error> {
    param.parse().map_err(|_| Error::not_found(param))
}

/// Split an `{id}` or `{id}.{ext}` path segment.
fn split_id_param(param: &str) -> Result<(FragmentId, Option<&str>), Error> {
    if let Ok(id) = param.parse::<FragmentId>() {
        return Ok((id, None));
    }
    if let Some((stem, ext)) = param.rsplit_once('.') {
        if let Ok(id) = stem.parse::<FragmentId>() {
            return Ok((id, Some(ext)));
        }
    }
    Err(Error::not_found(param))
}

/// Canonical URL for a fragment, built from the configured public URL or the
/// request's Host header.
fn location_for(ctx: &AppContext, headers: &HeaderMap, id: FragmentId) -> String {
    let base = ctx
        .config
        .server
        .public_url
        .clone()
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(|host| format!("http://{host}"))
        })
        .unwrap_or_default();
    format!("{}/v1/fragments/{}", base.trim_end_matches('/'), id)
}
