/*
 * Responsibility
 * - Heroes の response DTO
 * - 認可あり/なしで露出する shape を型で分ける (optional field の有無では表現しない)
 */
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HeroInfo {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub str: u32,
    pub int: u32,
    pub agi: u32,
    pub luk: u32,
}

#[derive(Debug, Serialize)]
pub struct AuthorizedHero {
    pub id: String,
    pub name: String,
    pub image: String,
    pub profile: ProfileStats,
}

/// handler が認可フラグで選ぶ応答 shape。serialize するとどちらかの構造がそのまま出る
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HeroBody {
    Authorized(AuthorizedHero),
    Public(HeroInfo),
}

#[derive(Debug, Serialize)]
pub struct HeroListBody {
    pub heroes: Vec<HeroBody>,
}
