/*
 * Responsibility
 * - 上流 hero サービスとの唯一の接点 (取得系 3 本 + 認証 1 本)
 * - 全レスポンスを厳密な shape validation に通してから上位へ渡す
 * - 失敗を HeroClientError へ分類 (404 / transport / status / payload)
 *
 * Notes
 * - 上流は失敗時にも HTTP 200 + `{code, message}` を返すことがある。
 *   decode/validate の失敗がエラー検出の本体であって、防御の上乗せではない
 */
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Result type for upstream hero operations.
pub type HeroResult<T> = Result<T, HeroClientError>;

/// 上流クライアントのエラー分類。
///
/// - `NotFound` はリソース不在 (上流 404)。boundary で 404 に変換される
/// - それ以外は全て「上流が契約通りに動いていない」扱いで 502 相当
#[derive(Debug, Error)]
pub enum HeroClientError {
    #[error("hero not found upstream")]
    NotFound,
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected upstream status: {0}")]
    Status(StatusCode),
    #[error("invalid upstream payload: {0}")]
    InvalidPayload(&'static str),
}

/// 上流が返す hero。フィールドはこの 3 つで完結し、余分な欄は decode 失敗になる
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl Hero {
    fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("id must be a non-empty string");
        }
        if self.name.trim().is_empty() {
            return Err("name must be a non-empty string");
        }
        if Url::parse(&self.image).is_err() {
            return Err("image must be a well-formed URL");
        }
        Ok(())
    }
}

/// hero のステータス。全項目が正の整数であること
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub str: u32,
    pub int: u32,
    pub agi: u32,
    pub luk: u32,
}

impl Profile {
    fn validate(&self) -> Result<(), &'static str> {
        // 負数・非整数は u32 decode の時点で弾かれる。残るのは 0 のみ
        if self.str == 0 || self.int == 0 || self.agi == 0 || self.luk == 0 {
            return Err("profile stats must be positive integers");
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    name: &'a str,
    password: &'a str,
}

/// 上流 hero サービスの操作面。
///
/// handler/middleware からは `Arc<dyn HeroApi>` で参照する
#[async_trait]
pub trait HeroApi: Send + Sync + 'static {
    async fn get_hero(&self, hero_id: &str) -> HeroResult<Hero>;
    async fn get_hero_list(&self) -> HeroResult<Vec<Hero>>;
    async fn get_profile(&self, hero_id: &str) -> HeroResult<Profile>;
    async fn auth(&self, name: &str, password: &str) -> HeroResult<bool>;
}

#[derive(Debug, Clone)]
pub struct HeroClient {
    http: reqwest::Client,
    base_url: String,
}

impl HeroClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        // 応答しない上流にリクエストを抱え込まれないよう、クライアント側にも締め切りを持つ
        let http = reqwest::Client::builder()
            .user_agent("hero-proxy/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, url: &str) -> HeroResult<reqwest::Response> {
        let res = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        Ok(res)
    }
}

/// 2xx 応答の body を decode する。shape が合わなければ InvalidPayload。
async fn decode<T: serde::de::DeserializeOwned>(res: reqwest::Response) -> HeroResult<T> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|_| HeroClientError::InvalidPayload("response body does not match the expected shape"))
}

#[async_trait]
impl HeroApi for HeroClient {
    async fn get_hero(&self, hero_id: &str) -> HeroResult<Hero> {
        let url = self.endpoint(&format!("/heroes/{}", hero_id));
        let res = self.get_json(&url).await?;

        match res.status() {
            StatusCode::NOT_FOUND => return Err(HeroClientError::NotFound),
            s if !s.is_success() => return Err(HeroClientError::Status(s)),
            _ => {}
        }

        let hero: Hero = decode(res).await?;
        hero.validate().map_err(HeroClientError::InvalidPayload)?;
        Ok(hero)
    }

    async fn get_hero_list(&self) -> HeroResult<Vec<Hero>> {
        let url = self.endpoint("/heroes");
        let res = self.get_json(&url).await?;

        // 一覧取得に 404 の特別扱いはない。2xx 以外は全て上流異常
        let status = res.status();
        if !status.is_success() {
            return Err(HeroClientError::Status(status));
        }

        let heroes: Vec<Hero> = decode(res).await?;
        if heroes.is_empty() {
            return Err(HeroClientError::InvalidPayload("hero list must not be empty"));
        }
        for hero in &heroes {
            hero.validate().map_err(HeroClientError::InvalidPayload)?;
        }
        Ok(heroes)
    }

    async fn get_profile(&self, hero_id: &str) -> HeroResult<Profile> {
        let url = self.endpoint(&format!("/heroes/{}/profile", hero_id));
        let res = self.get_json(&url).await?;

        match res.status() {
            StatusCode::NOT_FOUND => return Err(HeroClientError::NotFound),
            s if !s.is_success() => return Err(HeroClientError::Status(s)),
            _ => {}
        }

        let profile: Profile = decode(res).await?;
        profile.validate().map_err(HeroClientError::InvalidPayload)?;
        Ok(profile)
    }

    async fn auth(&self, name: &str, password: &str) -> HeroResult<bool> {
        let url = self.endpoint("/auth");
        let res = self
            .http
            .post(&url)
            .json(&AuthRequest { name, password })
            .send()
            .await?;

        match res.status() {
            // 401 は「認証情報が正しくない」という正常系の否定応答であってエラーではない
            StatusCode::UNAUTHORIZED => return Ok(false),
            s if !s.is_success() => return Err(HeroClientError::Status(s)),
            _ => {}
        }

        // 成功時の body はプレーンな "OK" 一語。それ以外の 200 は上流の異常
        let text = res.text().await?;
        if text == "OK" {
            Ok(true)
        } else {
            Err(HeroClientError::InvalidPayload("auth response body must be exactly \"OK\""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    /// 任意の Router を ephemeral port で立ち上げ、base URL を返す
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// 接続できない base URL (listener を bind してすぐ閉じる)
    async fn dead_upstream() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn daredevil() -> Value {
        json!({
            "id": "1",
            "name": "Daredevil",
            "image": "https://i.annihil.us/u/prod/marvel/i/mg/6/90/537ba6d49472b/standard_xlarge.jpg",
        })
    }

    async fn client_for(router: Router) -> HeroClient {
        HeroClient::new(spawn_upstream(router).await)
    }

    #[tokio::test]
    async fn get_hero_returns_valid_payload_unchanged() {
        let router = Router::new().route("/heroes/{id}", get(|| async { Json(daredevil()) }));
        let client = client_for(router).await;

        let hero = client.get_hero("1").await.unwrap();

        assert_eq!(hero.id, "1");
        assert_eq!(hero.name, "Daredevil");
        assert!(hero.image.starts_with("https://i.annihil.us/"));
    }

    #[tokio::test]
    async fn get_hero_maps_upstream_404_to_not_found() {
        let router = Router::new().route(
            "/heroes/{id}",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "Hero not found"}))) }),
        );
        let client = client_for(router).await;

        let err = client.get_hero("999").await.unwrap_err();
        assert!(matches!(err, HeroClientError::NotFound));
    }

    #[tokio::test]
    async fn get_hero_rejects_missing_field() {
        let router = Router::new().route(
            "/heroes/{id}",
            get(|| async { Json(json!({"id": "1", "name": "Daredevil"})) }),
        );
        let client = client_for(router).await;

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_hero_rejects_extra_field() {
        let mut body = daredevil();
        body["alignment"] = json!("good");
        let router = Router::new().route("/heroes/{id}", get(move || async move { Json(body) }));
        let client = client_for(router).await;

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_hero_rejects_error_payload_disguised_as_200() {
        // 上流は失敗を 200 + {code, message} で返すことがある
        let router = Router::new().route(
            "/heroes/{id}",
            get(|| async { Json(json!({"code": 1000, "message": "Backend Error"})) }),
        );
        let client = client_for(router).await;

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_hero_rejects_malformed_image_url() {
        let router = Router::new().route(
            "/heroes/{id}",
            get(|| async { Json(json!({"id": "1", "name": "Daredevil", "image": "not a url"})) }),
        );
        let client = client_for(router).await;

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload("image must be a well-formed URL")));
    }

    #[tokio::test]
    async fn get_hero_rejects_empty_id() {
        let router = Router::new().route(
            "/heroes/{id}",
            get(|| async {
                Json(json!({"id": "", "name": "Daredevil", "image": "https://example.com/d.jpg"}))
            }),
        );
        let client = client_for(router).await;

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload("id must be a non-empty string")));
    }

    #[tokio::test]
    async fn get_hero_maps_connection_failure_to_transport() {
        let client = HeroClient::new(dead_upstream().await);

        let err = client.get_hero("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::Transport(_)));
    }

    #[tokio::test]
    async fn get_hero_list_preserves_order() {
        let router = Router::new().route(
            "/heroes",
            get(|| async {
                Json(json!([
                    {"id": "1", "name": "Daredevil", "image": "https://example.com/1.jpg"},
                    {"id": "2", "name": "Thor", "image": "https://example.com/2.jpg"},
                    {"id": "3", "name": "Iron Man", "image": "https://example.com/3.jpg"},
                ]))
            }),
        );
        let client = client_for(router).await;

        let heroes = client.get_hero_list().await.unwrap();

        let ids: Vec<&str> = heroes.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn get_hero_list_rejects_empty_array() {
        let router = Router::new().route("/heroes", get(|| async { Json(json!([])) }));
        let client = client_for(router).await;

        let err = client.get_hero_list().await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload("hero list must not be empty")));
    }

    #[tokio::test]
    async fn get_hero_list_rejects_non_array_body() {
        let router = Router::new().route(
            "/heroes",
            get(|| async { Json(json!({"heroes": [daredevil()]})) }),
        );
        let client = client_for(router).await;

        let err = client.get_hero_list().await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_hero_list_rejects_invalid_element() {
        // 2 件目に image が無い
        let router = Router::new().route(
            "/heroes",
            get(|| async {
                Json(json!([
                    {"id": "1", "name": "Daredevil", "image": "https://example.com/1.jpg"},
                    {"id": "2", "name": "Thor"},
                ]))
            }),
        );
        let client = client_for(router).await;

        let err = client.get_hero_list().await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_hero_list_maps_upstream_500_to_status() {
        let router = Router::new().route(
            "/heroes",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );
        let client = client_for(router).await;

        let err = client.get_hero_list().await.unwrap_err();
        assert!(matches!(err, HeroClientError::Status(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn get_profile_returns_stats() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { Json(json!({"str": 2, "int": 7, "agi": 9, "luk": 7})) }),
        );
        let client = client_for(router).await;

        let profile = client.get_profile("1").await.unwrap();
        assert_eq!((profile.str, profile.int, profile.agi, profile.luk), (2, 7, 9, 7));
    }

    #[tokio::test]
    async fn get_profile_maps_upstream_404_to_not_found() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "Hero not found"}))) }),
        );
        let client = client_for(router).await;

        let err = client.get_profile("999").await.unwrap_err();
        assert!(matches!(err, HeroClientError::NotFound));
    }

    #[tokio::test]
    async fn get_profile_rejects_missing_stat() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { Json(json!({"int": 7, "agi": 9, "luk": 7})) }),
        );
        let client = client_for(router).await;

        let err = client.get_profile("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_profile_rejects_zero_stat() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { Json(json!({"str": 0, "int": 7, "agi": 9, "luk": 7})) }),
        );
        let client = client_for(router).await;

        let err = client.get_profile("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload("profile stats must be positive integers")));
    }

    #[tokio::test]
    async fn get_profile_rejects_negative_stat() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { Json(json!({"str": -1, "int": 7, "agi": 9, "luk": 7})) }),
        );
        let client = client_for(router).await;

        let err = client.get_profile("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn get_profile_rejects_non_integer_stat() {
        let router = Router::new().route(
            "/heroes/{id}/profile",
            get(|| async { Json(json!({"str": 2.5, "int": 7, "agi": 9, "luk": 7})) }),
        );
        let client = client_for(router).await;

        let err = client.get_profile("1").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn auth_accepts_ok_body_and_sends_credentials() {
        // 上流に届いた認証情報も合わせて確認する
        let router = Router::new().route(
            "/auth",
            post(|Json(body): Json<Value>| async move {
                if body == json!({"name": "hahow", "password": "rocks"}) {
                    "OK".into_response()
                } else {
                    StatusCode::BAD_REQUEST.into_response()
                }
            }),
        );
        let client = client_for(router).await;

        assert!(client.auth("hahow", "rocks").await.unwrap());
    }

    #[tokio::test]
    async fn auth_maps_401_to_false() {
        let router = Router::new().route(
            "/auth",
            post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))) }),
        );
        let client = client_for(router).await;

        assert!(!client.auth("wrong", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn auth_rejects_error_payload_disguised_as_200() {
        let router = Router::new().route(
            "/auth",
            post(|| async { Json(json!({"code": 1000, "message": "Backend Error"})) }),
        );
        let client = client_for(router).await;

        let err = client.auth("hahow", "rocks").await.unwrap_err();
        assert!(matches!(err, HeroClientError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn auth_maps_unexpected_status_to_error() {
        let router = Router::new().route(
            "/auth",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );
        let client = client_for(router).await;

        let err = client.auth("hahow", "rocks").await.unwrap_err();
        assert!(matches!(err, HeroClientError::Status(s) if s.as_u16() == 500));
    }
}
