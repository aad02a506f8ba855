//! Integration tests for the fragment CRUD routes.

mod common;

use common::{create_fragment, create_fragment_ok, get_fragment, TestHarness, ALICE, ALICE_API_KEY, BOB};
use serde_json::Value;

#[tokio::test]
async fn health_check_requires_no_auth() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap().to_str().unwrap(),
        "no-cache"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn unauthenticated_request_is_401() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/v1/fragments")).await.unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], 401);
}

#[tokio::test]
async fn wrong_password_is_401() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/v1/fragments"))
        .basic_auth(ALICE.0, Some("not-the-password"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn create_fragment_returns_metadata_and_location() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/fragments"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .body("fragment")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    assert_eq!(
        resp.headers().get("etag").unwrap().to_str().unwrap(),
        "\"1\""
    );
    let location = resp
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    let fragment = &body["fragment"];
    assert_eq!(fragment["type"], "text/plain");
    assert_eq!(fragment["size"], 8);
    assert_eq!(fragment["version"], 1);
    assert_eq!(fragment["created"], fragment["updated"]);

    let id = fragment["id"].as_str().unwrap();
    assert!(location.ends_with(&format!("/v1/fragments/{id}")));
}

#[tokio::test]
async fn create_with_unsupported_type_is_415() {
    let (_h, addr) = TestHarness::with_server().await;

    let (status, body) = create_fragment(addr, ALICE, "application/msword", &b"doc"[..]).await;
    assert_eq!(status, 415);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], 415);
}

#[tokio::test]
async fn create_without_content_type_is_415() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/fragments"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .body("fragment")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 415);
}

#[tokio::test]
async fn get_returns_raw_bytes_with_stored_type() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain; charset=utf-8", b"hello").await;

    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        resp.headers().get("etag").unwrap().to_str().unwrap(),
        "\"1\""
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"hello");
}

#[tokio::test]
async fn get_unknown_id_is_404() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = get_fragment(addr, ALICE, "2b2ec799-d70b-4a85-b983-64c1e4b0a09c").await;
    assert_eq!(resp.status(), 404);

    // Garbage ids cannot name any fragment either.
    let resp = get_fragment(addr, ALICE, "not-a-uuid").await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn list_returns_ids_then_expanded_metadata() {
    let (_h, addr) = TestHarness::with_server().await;

    let first = create_fragment_ok(addr, ALICE, "text/plain", b"one").await;
    let second = create_fragment_ok(addr, ALICE, "application/json", b"{}").await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/v1/fragments"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    let ids: Vec<&str> = body["fragments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/v1/fragments?expand=1"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let fragments = body["fragments"].as_array().unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0]["id"], first.as_str());
    assert_eq!(fragments[1]["type"], "application/json");
    assert_eq!(fragments[0]["size"], 3);
}

#[tokio::test]
async fn fragments_are_not_visible_across_owners() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"alice's secret").await;

    // Bob cannot read, list, replace, or delete Alice's fragment.
    let resp = get_fragment(addr, BOB, &id).await;
    assert_eq!(resp.status(), 404);

    let resp = get_fragment(addr, BOB, &format!("{id}/info")).await;
    assert_eq!(resp.status(), 404);

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/v1/fragments"))
        .basic_auth(BOB.0, Some(BOB.1))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fragments"].as_array().unwrap().len(), 0);

    let resp = reqwest::Client::new()
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(BOB.0, Some(BOB.1))
        .header("Content-Type", "text/plain")
        .body("overwrite")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(BOB.0, Some(BOB.1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Alice's fragment is untouched.
    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"alice's secret");
}

#[tokio::test]
async fn info_returns_metadata_only() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/markdown", b"# Title").await;

    let resp = get_fragment(addr, ALICE, &format!("{id}/info")).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["fragment"]["id"], id.as_str());
    assert_eq!(body["fragment"]["type"], "text/markdown");
    assert_eq!(body["fragment"]["size"], 7);
}

#[tokio::test]
async fn put_replaces_payload_and_advances_metadata() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"short").await;

    let resp = reqwest::Client::new()
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .body("a rather longer payload")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("etag").unwrap().to_str().unwrap(),
        "\"2\""
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fragment"]["size"], 23);
    assert_eq!(body["fragment"]["version"], 2);

    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"a rather longer payload");
}

#[tokio::test]
async fn put_with_different_type_is_400() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"text").await;

    let resp = reqwest::Client::new()
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "application/json")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The stored fragment is unchanged.
    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"text");
}

#[tokio::test]
async fn put_unknown_id_is_404() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .put(format!(
            "http://{addr}/v1/fragments/2b2ec799-d70b-4a85-b983-64c1e4b0a09c"
        ))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn put_with_stale_if_match_is_409() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"v1").await;
    let client = reqwest::Client::new();

    // First writer advances the version to 2.
    let resp = client
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .body("v2")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Second writer still holds version 1.
    let resp = client
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .header("If-Match", "\"1\"")
        .body("v3")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // The stale write did not land.
    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"v2");

    // Retrying with the current version succeeds.
    let resp = client
        .put(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .header("Content-Type", "text/plain")
        .header("If-Match", "\"2\"")
        .body("v3")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"doomed").await;
    let client = reqwest::Client::new();

    let resp = client
        .delete(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.status(), 404);

    // Deleting a nonexistent fragment is always 404.
    let resp = client
        .delete(format!("http://{addr}/v1/fragments/{id}"))
        .basic_auth(ALICE.0, Some(ALICE.1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn api_key_resolves_to_the_same_owner() {
    let (_h, addr) = TestHarness::with_server().await;

    // Create with Alice's API key.
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/fragments"))
        .header("Authorization", format!("Bearer {ALICE_API_KEY}"))
        .header("Content-Type", "text/plain")
        .body("via api key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let id = body["fragment"]["id"].as_str().unwrap().to_string();

    // Read with Alice's password: same owner, same fragment.
    let resp = get_fragment(addr, ALICE, &id).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"via api key");
}

#[tokio::test]
async fn size_always_matches_stored_payload() {
    let (_h, addr) = TestHarness::with_server().await;

    let id = create_fragment_ok(addr, ALICE, "text/plain", b"12345").await;

    let resp = get_fragment(addr, ALICE, &format!("{id}/info")).await;
    let body: Value = resp.json().await.unwrap();
    let size = body["fragment"]["size"].as_u64().unwrap();

    let resp = get_fragment(addr, ALICE, &id).await;
    let payload = resp.bytes().await.unwrap();
    assert_eq!(size, payload.len() as u64);
}
