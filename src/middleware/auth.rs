//! 認可解決 middleware。
//!
//! - `name` / `password` ヘッダを読み、上流 `/auth` で検証して
//!   `AuthCtx { has_permission }` を request extensions に入れる
//! - ヘッダが欠けている・文字列として読めない場合は上流を呼ばずに has_permission = false
//! - 上流 auth がエラーで落ちた場合はそのまま 502 へ伝播させる
//!   (認可インフラの障害を「未認証」に黙って落とさない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// hero 系ルートに認可解決を掛ける。
///
/// 例：
/// ```ignore
/// let heroes = Router::new().route("/heroes", get(list_heroes));
/// let heroes = middleware::auth::apply(heroes, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, resolve_permission))
}

async fn resolve_permission(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let name = header_str(&req, "name");
    let password = header_str(&req, "password");

    let has_permission = match (name, password) {
        (Some(name), Some(password)) => match state.hero.auth(name, password).await {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(error = ?err, "upstream auth call failed");
                return Err(err.into());
            }
        },
        // 認証情報が揃っていなければ上流は呼ばない
        _ => false,
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx { has_permission });

    Ok(next.run(req).await)
}

fn header_str<'a>(req: &'a Request<Body>, key: &str) -> Option<&'a str> {
    req.headers()
        .get(key)
        .and_then(|v| v.to_str().ok())
        // 空文字は「未提供」と同じ扱い
        .filter(|v| !v.is_empty())
}
