/*
 * Responsibility
 * - Handler から見える「認可解決済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 上流 /auth を呼ぶロジックは middleware/auth 側の責務
 * - リクエスト単位で毎回計算される。キャッシュや永続化はしない
 */
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// リクエストに付与される認可フラグ
#[derive(Debug, Clone, Copy)]
pub struct AuthCtx {
    pub has_permission: bool,
}

impl FromRequestParts<AppState> for AuthCtx {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // middleware は未認証でも必ず AuthCtx を入れる。
        // 見つからない場合は auth middleware を通っていないルートで使われた配線ミス
        parts
            .extensions
            .get::<AuthCtx>()
            .copied()
            .ok_or(AppError::Internal)
    }
}
