/*
 * Responsibility
 * - URL 構造を定義 (/health, /heroes, /heroes/{hero_id})
 * - auth middleware を掛ける範囲をここで決める (/heroes 系のみ)
 * - 未定義ルートの 404 fallback
 */
use axum::{
    Json, Router,
    extract::OriginalUri,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::api::handlers::{
    health::health,
    heroes::{get_hero, list_heroes},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let heroes = Router::new()
        .route("/heroes", get(list_heroes))
        .route("/heroes/{hero_id}", get(get_hero));
    // 認可解決は hero 系ルートのみ。/health は素通し
    let heroes = middleware::auth::apply(heroes, state);

    Router::new()
        .route("/health", get(health))
        .merge(heroes)
        .fallback(route_not_found)
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}
