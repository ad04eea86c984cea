mod support;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use screenpass::auth::providers::Provider;
use screenpass::auth::store::{CredentialStore, Role};
use screenpass::auth::AuthError;
use screenpass::client::{AuthedClient, RequestSpec};

use support::{mock_service, InMemoryCredentialStore};

fn client_and_store(server: &MockServer) -> (AuthedClient, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let svc = Arc::new(mock_service(store.clone(), server));
    (AuthedClient::new(svc), store)
}

#[tokio::test]
async fn call_attaches_bearer_token_for_trakt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/lists"))
        .and(header("authorization", "Bearer acc-live"))
        .and(header("trakt-api-version", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Trakt, Role::AccessToken, "acc-live");

    let response = client
        .call(Provider::Trakt, &RequestSpec::get("/users/me/lists"))
        .await
        .expect("call");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn call_attaches_query_token_for_premiumize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/folder/list"))
        .and(query_param("access_token", "prem-acc"))
        .and(query_param("id", "folder-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "content": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Premiumize, Role::AccessToken, "prem-acc");

    let spec = RequestSpec::get("/folder/list").with_query("id", "folder-1");
    let response = client
        .call(Provider::Premiumize, &spec)
        .await
        .expect("call");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn call_without_stored_token_is_auth_required() {
    let server = MockServer::start().await;
    let (client, _store) = client_and_store(&server);

    let result = client
        .call(Provider::Trakt, &RequestSpec::get("/users/me/lists"))
        .await;
    assert!(matches!(
        result,
        Err(AuthError::AuthRequired {
            provider: Provider::Trakt
        })
    ));
}

#[tokio::test]
async fn unauthorized_with_refreshable_token_replays_exactly_once() {
    let server = MockServer::start().await;
    // The API endpoint rejects every attempt; the request must go out exactly
    // twice (original + one replay), never more.
    Mock::given(method("GET"))
        .and(path("/users/me/lists"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    // Probe of the stale token fails, refresh succeeds.
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc-fresh",
            "refresh_token": "ref-fresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Trakt, Role::AccessToken, "acc-stale");
    store.seed(Provider::Trakt, Role::RefreshToken, "ref-old");

    // The replayed response comes back as-is, 401 or not.
    let response = client
        .call(Provider::Trakt, &RequestSpec::get("/users/me/lists"))
        .await
        .expect("replayed response");
    assert_eq!(response.status(), 401);

    // The refreshed pair was persisted even though the replay still failed.
    assert_eq!(
        store
            .get(Provider::Trakt, Role::AccessToken)
            .unwrap()
            .as_deref(),
        Some("acc-fresh")
    );
    assert_eq!(
        store
            .get(Provider::Trakt, Role::RefreshToken)
            .unwrap()
            .as_deref(),
        Some("ref-fresh")
    );
    server.verify().await;
}

#[tokio::test]
async fn unauthorized_recovery_succeeds_with_fresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/lists"))
        .and(header("authorization", "Bearer acc-stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me/lists"))
        .and(header("authorization", "Bearer acc-fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "watchlist"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc-fresh",
            "refresh_token": "ref-fresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Trakt, Role::AccessToken, "acc-stale");
    store.seed(Provider::Trakt, Role::RefreshToken, "ref-old");

    let response = client
        .call(Provider::Trakt, &RequestSpec::get("/users/me/lists"))
        .await
        .expect("call");
    assert!(response.status().is_success());
    server.verify().await;
}

#[tokio::test]
async fn unauthorized_without_refresh_clears_credentials_and_surfaces_auth_required() {
    let server = MockServer::start().await;
    // One API attempt, no replay.
    Mock::given(method("GET"))
        .and(path("/api/folder/list"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    // Validator probe confirms the token is dead.
    Mock::given(method("GET"))
        .and(path("/api/account/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "Invalid access token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Premiumize, Role::AccessToken, "prem-stale");
    store.seed(Provider::Premiumize, Role::Username, "leftover");

    let result = client
        .call(Provider::Premiumize, &RequestSpec::get("/folder/list"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::AuthRequired {
            provider: Provider::Premiumize
        })
    ));
    for role in Role::ALL {
        assert!(store.get(Provider::Premiumize, role).unwrap().is_none());
    }
    server.verify().await;
}

#[tokio::test]
async fn post_body_is_replayed_verbatim_after_refresh() {
    let server = MockServer::start().await;
    let body = json!({ "movies": [{ "ids": { "tmdb": 603 } }] });
    Mock::given(method("POST"))
        .and(path("/users/me/lists/42/items"))
        .and(wiremock::matchers::body_json(body.clone()))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/me/lists/42/items"))
        .and(wiremock::matchers::body_json(body.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "added": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc-fresh",
            "refresh_token": "ref-fresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_and_store(&server);
    store.seed(Provider::Trakt, Role::AccessToken, "acc-stale");
    store.seed(Provider::Trakt, Role::RefreshToken, "ref-old");

    let spec = RequestSpec::post("/users/me/lists/42/items", body);
    let response = client.call(Provider::Trakt, &spec).await.expect("call");
    assert_eq!(response.status(), 201);
    server.verify().await;
}
