mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

/// The versioned API surface. Everything the OBE backend exposes lives under
/// `/v1`; `build_router` nests this under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}
