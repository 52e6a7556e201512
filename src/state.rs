/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - 上流クライアントを Arc<dyn HeroApi> で保持 (Clone 前提で持つ)
 */
use std::sync::Arc;

use crate::clients::hero::HeroApi;

#[derive(Clone)]
pub struct AppState {
    pub hero: Arc<dyn HeroApi>,
}

impl AppState {
    pub fn new(hero: Arc<dyn HeroApi>) -> Self {
        Self { hero }
    }
}
