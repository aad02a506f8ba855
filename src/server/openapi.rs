//! OpenAPI documentation and Swagger UI integration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::AppContext;

/// OpenAPI documentation for fragstore.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fragstore API",
        version = "0.1.0",
        description = "Owner-scoped fragment storage with on-the-fly format conversion",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes::create_fragment,
        super::routes::list_fragments,
        super::routes::get_fragment,
        super::routes::get_fragment_info,
        super::routes::put_fragment,
        super::routes::delete_fragment,
    ),
    components(
        schemas(
            super::routes::FragmentDto,
        )
    ),
    tags(
        (name = "fragments", description = "Fragment storage and conversion endpoints"),
    )
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes.
/// - `/docs` - Swagger UI
/// - `/openapi.json` - Raw OpenAPI JSON spec (served by SwaggerUi)
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}
