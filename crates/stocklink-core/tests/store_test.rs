#![allow(clippy::unwrap_used)]
// Integration tests for `StateStore` action protocols using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stocklink_api::models::NewFavorite;
use stocklink_api::storage::{self, keys};
use stocklink_api::{ApiClient, KeyValueStore, MemoryStorage, TransportConfig};
use stocklink_core::model::UpdateLogQuery;
use stocklink_core::{
    FavoriteStock, IndexQuote, MarketOverview, ScanLoginOutcome, StateStore, UserProfile,
    WechatMessage,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    store: StateStore,
    storage: Arc<MemoryStorage>,
    session_storage: Arc<MemoryStorage>,
}

fn store_for(base: &str, storage: &Arc<MemoryStorage>, session: &Arc<MemoryStorage>) -> StateStore {
    let transport =
        TransportConfig::new(Url::parse(base).unwrap()).with_timeout(Duration::from_secs(5));
    let api = Arc::new(ApiClient::new(&transport, storage.clone()).unwrap());
    StateStore::new(api, storage.clone(), session.clone())
}

async fn setup() -> Harness {
    setup_with(|_| {}).await
}

/// Seed storage before the store bootstraps.
async fn setup_with(seed: impl FnOnce(&MemoryStorage)) -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let session_storage = Arc::new(MemoryStorage::new());
    seed(&storage);
    let store = store_for(&server.uri(), &storage, &session_storage);
    Harness {
        server,
        store,
        storage,
        session_storage,
    }
}

fn signed_in(storage: &MemoryStorage) {
    storage.set(keys::TOKEN, "jwt").unwrap();
    storage::write_json(
        storage,
        keys::USER,
        &UserProfile {
            id: Some(1),
            name: Some("alice".into()),
            ..UserProfile::default()
        },
    )
    .unwrap();
    storage::write_json(
        storage,
        keys::FAVORITES,
        &vec![FavoriteStock::new("600519", "贵州茅台")],
    )
    .unwrap();
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "data": data }))
}

fn codes(store: &StateStore) -> Vec<String> {
    store.favorites().iter().map(|s| s.code.clone()).collect()
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bootstrap_hydrates_from_storage() {
    let h = setup_with(signed_in).await;
    assert!(h.store.is_authenticated());
    assert_eq!(h.store.current_user().unwrap().name.as_deref(), Some("alice"));
    assert_eq!(codes(&h.store), ["600519"]);
}

#[tokio::test]
async fn test_bootstrap_ignores_profile_without_token() {
    let h = setup_with(|s| {
        signed_in(s);
        s.remove(keys::TOKEN).unwrap();
    })
    .await;
    assert!(!h.store.is_authenticated());
    assert!(h.store.current_user().is_none());
    assert!(h.store.favorites().is_empty());
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_restore_session_hydrates_profile() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/user/info"))
        .respond_with(ok(json!({
            "user_id": 1,
            "nickname": "alice2",
            "avatar_url": "a.png",
            "role": "user",
            "created_at": "2025-01-01 00:00:00",
            "stocks_count": 1
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.store.restore_session().await);
    let user = h.store.current_user().unwrap();
    assert_eq!(user.name.as_deref(), Some("alice2"));
    let persisted: UserProfile = storage::read_json(h.storage.as_ref(), keys::USER).unwrap();
    assert_eq!(persisted, user);
}

#[tokio::test]
async fn test_restore_session_without_token_makes_no_request() {
    let h = setup().await;

    Mock::given(method("GET"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&h.server)
        .await;

    assert!(!h.store.restore_session().await);
}

#[tokio::test]
async fn test_restore_session_domain_failure_clears_everything() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/user/info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": 404, "msg": "用户不存在" })),
        )
        .mount(&h.server)
        .await;

    assert!(!h.store.restore_session().await);
    assert!(!h.store.is_authenticated());
    assert!(h.store.current_user().is_none());
    assert!(h.store.favorites().is_empty());
    assert!(!h.storage.contains(keys::TOKEN));
    assert!(!h.storage.contains(keys::FAVORITES));
}

#[tokio::test]
async fn test_unauthorized_anywhere_clears_session_in_one_commit() {
    let h = setup_with(signed_in).await;
    let mut sub = h.store.subscribe_session();

    Mock::given(method("GET"))
        .and(path("/api/stocks/hot"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_hot_stocks("国内人气榜").await.is_empty());

    let snap = sub.changed().await.unwrap();
    assert!(!snap.is_authenticated());
    assert!(snap.profile().is_none());
    assert!(snap.favorites().is_empty());
    assert!(!h.storage.contains(keys::USER));
    assert!(!h.storage.contains(keys::FAVORITES));
}

#[tokio::test]
async fn test_login_then_logout() {
    let h = setup().await;
    h.session_storage.set("scroll", "120").unwrap();
    h.storage.set(keys::APP_VERSION, "v1").unwrap();

    let profile = UserProfile {
        id: Some(9),
        name: Some("bob".into()),
        ..UserProfile::default()
    };
    h.store.login("tok-9", profile.clone()).unwrap();
    assert!(h.store.is_authenticated());
    assert_eq!(h.storage.get(keys::TOKEN).as_deref(), Some("tok-9"));
    assert_eq!(h.store.current_user(), Some(profile));

    h.store.logout();
    assert!(!h.store.is_authenticated());
    for key in [keys::TOKEN, keys::USER, keys::FAVORITES, keys::APP_VERSION] {
        assert!(!h.storage.contains(key), "{key} should be gone");
    }
    assert!(h.session_storage.is_empty());
}

#[tokio::test]
async fn test_login_rejects_blank_token() {
    let h = setup().await;
    let err = h.store.login("  ", UserProfile::default()).unwrap_err();
    assert!(matches!(err, stocklink_core::CoreError::ValidationFailed { .. }));
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn test_fetch_finishing_after_logout_persists_nothing() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(
            ok(json!([{ "code": "000001", "name": "平安银行" }]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&h.server)
        .await;

    tokio::join!(h.store.fetch_favorites(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.store.logout();
    });

    assert!(!h.store.is_authenticated());
    assert!(h.store.favorites().is_empty());
    for key in [keys::TOKEN, keys::USER, keys::FAVORITES] {
        assert!(!h.storage.contains(key), "{key} should stay gone");
    }

    h.store.login("user-b", UserProfile::default()).unwrap();
    let next = store_for(&h.server.uri(), &h.storage, &h.session_storage);
    assert!(next.is_authenticated());
    assert!(next.favorites().is_empty());
}

#[tokio::test]
async fn test_login_drops_watch_list_left_by_earlier_account() {
    let h = setup_with(|s| {
        signed_in(s);
        s.remove(keys::TOKEN).unwrap();
    })
    .await;

    h.store.login("tok-2", UserProfile::default()).unwrap();
    assert!(!h.storage.contains(keys::FAVORITES));

    let next = store_for(&h.server.uri(), &h.storage, &h.session_storage);
    assert!(next.favorites().is_empty());
}

#[tokio::test]
async fn test_update_profile_merges_into_held_profile() {
    let h = setup_with(signed_in).await;

    Mock::given(method("POST"))
        .and(path("/api/user/profile"))
        .respond_with(ok(json!({ "user_id": 1, "nickname": "neo", "avatar_url": "n.png" })))
        .mount(&h.server)
        .await;

    assert!(h.store.update_profile("neo", "n.png").await);
    let user = h.store.current_user().unwrap();
    assert_eq!(user.id, Some(1));
    assert_eq!(user.name.as_deref(), Some("neo"));
    assert_eq!(user.avatar.as_deref(), Some("n.png"));
}

#[tokio::test]
async fn test_scan_login_confirmed_without_profile_restores_it() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/login-status"))
        .and(query_param("state", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "status": "confirmed",
            "token": "fresh",
            "user_id": 4,
            "expires_in": 3600
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/info"))
        .respond_with(ok(json!({ "user_id": 4, "nickname": "carol" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.store.poll_scan_login("s-1").await.unwrap();
    let ScanLoginOutcome::Confirmed { profile } = outcome else {
        panic!("expected confirmation, got {outcome:?}");
    };
    assert_eq!(profile.unwrap().name.as_deref(), Some("carol"));
    assert_eq!(h.storage.get(keys::TOKEN).as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_scan_login_pending() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/login-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "status": "pending",
            "remaining": 120
        })))
        .mount(&h.server)
        .await;

    let outcome = h.store.poll_scan_login("s-2").await.unwrap();
    assert_eq!(outcome, ScanLoginOutcome::Pending { remaining: Some(120) });
    assert!(!h.store.is_authenticated());
}

// ── Favorites ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_then_fetch_contains_new_codes_once() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ok(json!([{ "code": "600519", "name": "贵州茅台" }])))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ok(json!([
            { "code": "600519", "name": "贵州茅台" },
            { "code": "000001", "name": "平安银行" },
            { "code": "000001", "name": "平安银行" }
        ])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/stocks/add"))
        .respond_with(ok(json!({ "added": [{ "code": "000001" }], "errors": [], "total_added": 1 })))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_favorites().await);
    assert_eq!(codes(&h.store), ["600519"]);

    let result = h
        .store
        .add_favorites(&[NewFavorite::code("000001")])
        .await
        .unwrap();
    assert_eq!(result.total_added, 1);

    assert!(h.store.fetch_favorites().await);
    assert_eq!(codes(&h.store), ["600519", "000001"]);

    let persisted: Vec<FavoriteStock> =
        storage::read_json(h.storage.as_ref(), keys::FAVORITES).unwrap();
    assert_eq!(persisted.len(), 2);
}

#[tokio::test]
async fn test_add_domain_failure_keeps_list_and_returns_none() {
    let h = setup_with(signed_in).await;

    Mock::given(method("POST"))
        .and(path("/api/stocks/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 1, "msg": "已存在" })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&h.server)
        .await;

    let before = h.store.favorites();
    assert!(h.store.add_favorites(&[NewFavorite::code("600519")]).await.is_none());
    assert_eq!(h.store.favorites(), before);
}

#[tokio::test]
async fn test_fetch_favorites_failure_keeps_prior_list() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&h.server)
        .await;

    assert!(!h.store.fetch_favorites().await);
    assert_eq!(codes(&h.store), ["600519"]);
}

#[tokio::test]
async fn test_remove_refetches_whole_list() {
    let h = setup_with(signed_in).await;

    Mock::given(method("POST"))
        .and(path("/api/stocks/remove"))
        .respond_with(ok(json!({ "deleted_codes": ["600519"], "total_deleted": 1 })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.store.remove_favorites(&["600519".to_owned()]).await.unwrap();
    assert_eq!(result.deleted_codes, ["600519"]);
    assert!(h.store.favorites().is_empty());
}

// ── Market ──────────────────────────────────────────────────────────

fn expected_fallback() -> MarketOverview {
    [
        ("shangzheng", 3341.99, -0.30),
        ("shenzheng", 10126.83, -0.70),
        ("chuangye", 2011.77, -0.87),
    ]
    .into_iter()
    .map(|(k, value, change)| (k.to_owned(), IndexQuote { value, change }))
    .collect()
}

#[tokio::test]
async fn test_market_overview_network_failure_commits_fallback() {
    // Nothing listens on the discard port.
    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(MemoryStorage::new());
    let store = store_for("http://127.0.0.1:9", &storage, &session);

    let overview = store.fetch_market_overview().await;
    assert_eq!(*overview, expected_fallback());
    assert_eq!(*store.market_overview(), expected_fallback());
}

#[tokio::test]
async fn test_market_overview_maps_canonical_keys() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/market/overview"))
        .respond_with(ok(json!([
            { "index": "上证指数", "value": 3400.1, "change": 10.2, "change_pct": 0.3 },
            { "index": "恒生科技指数", "value": 5000.0, "change": -5.0, "change_pct": -0.1 }
        ])))
        .mount(&h.server)
        .await;

    let overview = h.store.fetch_market_overview().await;
    let keys: Vec<_> = overview.iter().map(|(k, _)| k.to_owned()).collect();
    assert_eq!(keys, ["shangzheng", "hktech"]);
    assert_eq!(
        overview.get("hktech"),
        Some(&IndexQuote {
            value: 5000.0,
            change: -0.1
        })
    );
}

#[tokio::test]
async fn test_market_overview_domain_failure_commits_fallback() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/market/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 1 })))
        .mount(&h.server)
        .await;

    assert_eq!(*h.store.fetch_market_overview().await, expected_fallback());
}

// ── Content ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tag_stocks_sorted_by_change_descending() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/leaders"))
        .and(query_param("tag", "机器人"))
        .respond_with(ok(json!({
            "description": "robots",
            "leaders": [
                { "code": "a", "change_percent": 1.2 },
                { "code": "b", "change_percent": 5.5 },
                { "code": "c", "change_percent": -0.3 }
            ]
        })))
        .mount(&h.server)
        .await;

    let tags = h.store.fetch_tag_stocks("机器人").await.unwrap();
    let order: Vec<_> = tags.stocks.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(order, ["b", "a", "c"]);
    assert_eq!(tags.description, "robots");
}

#[tokio::test]
async fn test_tag_stocks_flat_changes_keep_backend_order() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/leaders"))
        .respond_with(ok(json!({
            "leaders": [
                { "code": "A", "change_percent": "-0.00" },
                { "code": "B", "change_percent": 0.0 }
            ]
        })))
        .mount(&h.server)
        .await;

    let tags = h.store.fetch_tag_stocks("flat").await.unwrap();
    let order: Vec<_> = tags.stocks.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(order, ["A", "B"]);
}

#[tokio::test]
async fn test_tag_stocks_transport_error_propagates() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/leaders"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_tag_stocks("x").await.is_err());
}

#[tokio::test]
async fn test_wechat_blank_id_returns_empty_without_request() {
    let h = setup().await;

    Mock::given(method("GET"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&h.server)
        .await;

    assert_eq!(h.store.fetch_wechat_message("").await, WechatMessage::empty());
    assert_eq!(h.store.fetch_wechat_message("  ").await, WechatMessage::empty());
}

#[tokio::test]
async fn test_wechat_message_failures_degrade_to_empty() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/wechat"))
        .and(query_param("msgid", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wechat"))
        .and(query_param("msgid", "odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hello": "world" })))
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_wechat_message("broken").await.is_empty());
    assert!(h.store.fetch_wechat_message("odd").await.is_empty());
}

#[tokio::test]
async fn test_wechat_enveloped_stock_push_is_classified() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/wechat"))
        .respond_with(ok(json!({
            "stock_id": "600519",
            "stock_name": "贵州茅台",
            "title": "公告",
            "content": "..."
        })))
        .mount(&h.server)
        .await;

    let msg = h.store.fetch_wechat_message("m").await;
    let WechatMessage::Stock(push) = msg else {
        panic!("expected stock push, got {msg:?}");
    };
    assert_eq!(push.stock_name, "贵州茅台");
}

#[tokio::test]
async fn test_evaluation_requires_session() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/eva"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_evaluation("600519", false).await.is_none());
}

#[tokio::test]
async fn test_evaluation_applies_defaults() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/eva"))
        .and(query_param("refresh", "0"))
        .respond_with(ok(json!({ "evaluation_time": "2025-05-01 09:00:00" })))
        .mount(&h.server)
        .await;

    let eval = h.store.fetch_evaluation("600519", false).await.unwrap();
    assert_eq!(eval.conclusion, "未知");
    assert_eq!(eval.reason, "暂无评估理由");
    assert_eq!(eval.evaluation_time, "2025-05-01 09:00:00");
}

#[tokio::test]
async fn test_news_detail_domain_failure_is_none_but_errors_propagate() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/news/detail"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 1 })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news/detail"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    assert_eq!(h.store.fetch_news_detail("1").await.unwrap(), None);
    assert!(h.store.fetch_news_detail("2").await.is_err());
}

#[tokio::test]
async fn test_stock_news_normalizes_pagination() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/news/get"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .respond_with(ok(json!({
            "news": [{ "id": 1 }, { "id": 2 }],
            "pagination": { "page": 2, "limit": 5, "total": 12, "total_pages": 3, "has_more": true }
        })))
        .mount(&h.server)
        .await;

    let page = h.store.fetch_stock_news("600519", 2, 5).await;
    assert_eq!(page.list.len(), 2);
    assert_eq!((page.current_page, page.total_pages, page.total), (2, 3, 12));
    assert!(page.has_more);

    let empty = h.store.fetch_stock_news("", 1, 5).await;
    assert_eq!(empty, stocklink_core::NewsPage::default());
}

#[tokio::test]
async fn test_update_logs_propagate_but_types_degrade() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs/types"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    assert!(h.store.fetch_update_logs(&UpdateLogQuery::default()).await.is_err());
    assert!(h.store.fetch_update_types().await.is_empty());
}

#[tokio::test]
async fn test_push_settings_round_trip() {
    let h = setup_with(signed_in).await;

    Mock::given(method("GET"))
        .and(path("/api/wechat/push/settings"))
        .and(query_param("user_id", "1"))
        .respond_with(ok(json!({ "user_id": 1, "settings": { "morning": true, "close": false } })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wechat/push/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0 })))
        .mount(&h.server)
        .await;

    let mut settings = h.store.fetch_push_settings(1).await.settings;
    assert_eq!(settings.get("morning"), Some(&true));
    settings.insert("close".into(), true);
    assert!(h.store.update_push_settings(1, &settings).await);
}

#[tokio::test]
async fn test_assistant_answers_and_rejections() {
    let h = setup_with(signed_in).await;

    Mock::given(method("POST"))
        .and(path("/api/chat/query"))
        .and(wiremock::matchers::body_json(json!({ "query": "茅台怎么样" })))
        .respond_with(ok(json!({ "answer": "稳健" })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/query"))
        .and(wiremock::matchers::body_json(json!({ "query": "busy" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": 1, "msg": "稍后再试" })),
        )
        .mount(&h.server)
        .await;

    let answer = h.store.ask_assistant("茅台怎么样").await.unwrap();
    assert_eq!(answer["answer"], json!("稳健"));

    let err = h.store.ask_assistant("busy").await.unwrap_err();
    assert!(matches!(
        err,
        stocklink_core::CoreError::Rejected { code: 1, ref message } if message == "稍后再试"
    ));
    assert!(h.store.is_authenticated());
}
