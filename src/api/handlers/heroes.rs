/*
 * Responsibility
 * - /heroes 系 handler (一覧取得 + 単体取得)
 * - AuthCtx を見て profile enrichment を行うか決める
 * - 一覧の profile 取得は並列 fan-out し、index 対応でマージする
 */
use axum::{
    Json,
    extract::{Path, State},
};
use futures::future;

use crate::{
    api::{
        dto::heroes::{AuthorizedHero, HeroBody, HeroInfo, HeroListBody, ProfileStats},
        extractors::AuthCtx,
    },
    clients::hero::{Hero, Profile},
    error::AppError,
    state::AppState,
};

fn public_body(hero: Hero) -> HeroBody {
    HeroBody::Public(HeroInfo {
        id: hero.id,
        name: hero.name,
        image: hero.image,
    })
}

fn authorized_body(hero: Hero, profile: Profile) -> HeroBody {
    HeroBody::Authorized(AuthorizedHero {
        id: hero.id,
        name: hero.name,
        image: hero.image,
        profile: ProfileStats {
            str: profile.str,
            int: profile.int,
            agi: profile.agi,
            luk: profile.luk,
        },
    })
}

pub async fn get_hero(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(hero_id): Path<String>,
) -> Result<Json<HeroBody>, AppError> {
    let hero = state.hero.get_hero(&hero_id).await?;

    if !ctx.has_permission {
        return Ok(Json(public_body(hero)));
    }

    let profile = state.hero.get_profile(&hero_id).await?;
    Ok(Json(authorized_body(hero, profile)))
}

pub async fn list_heroes(
    State(state): State<AppState>,
    ctx: AuthCtx,
) -> Result<Json<HeroListBody>, AppError> {
    let heroes = state.hero.get_hero_list().await?;

    if !ctx.has_permission {
        let heroes = heroes.into_iter().map(public_body).collect();
        return Ok(Json(HeroListBody { heroes }));
    }

    // profile は hero ごとに独立しているのでまとめて発行する。
    // try_join_all は入力順を保ったまま全完了を待ち、1 本でも失敗すれば全体が失敗する
    let profiles =
        future::try_join_all(heroes.iter().map(|hero| state.hero.get_profile(&hero.id))).await?;

    let heroes = heroes
        .into_iter()
        .zip(profiles)
        .map(|(hero, profile)| authorized_body(hero, profile))
        .collect();

    Ok(Json(HeroListBody { heroes }))
}
