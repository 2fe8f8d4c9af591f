mod common;

use common::{ADMIN_TOKEN, bearer};
use serde_json::{Value, json};
use sqlx::PgPool;

#[sqlx::test]
async fn test_create_normalizes_and_serves_immediately(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": " old page ", "to_path": "new-page" }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body = response.json::<Value>();
    assert_eq!(body["from_path"], "/oldpage/");
    assert_eq!(body["to_path"], "/new-page/");
    assert_eq!(body["redirect_type"], "Permanent");
    assert_eq!(body["status_code"], 301);
    assert_eq!(body["from_link"], "/oldpage/");

    let redirect = server.get("/oldpage/").await;
    assert_eq!(redirect.status_code(), 301);
    assert_eq!(redirect.header("location"), "/new-page/");
}

#[sqlx::test]
async fn test_create_redirect_to_site_root(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "/old/", "to_path": "/" }))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<Value>()["to_path"], "/");

    let redirect = server.get("/old/").await;
    assert_eq!(redirect.status_code(), 301);
    assert_eq!(redirect.header("location"), "/");
}

#[sqlx::test]
async fn test_create_vanity_external_target(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({
            "from_path": "/spring/",
            "to_path": "https://shop.example.com/spring",
            "redirect_type": "Vanity"
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<Value>()["status_code"], 302);

    let redirect = server.get("/spring/").await;
    assert_eq!(redirect.status_code(), 302);
    assert_eq!(redirect.header("location"), "https://shop.example.com/spring");
}

#[sqlx::test]
async fn test_create_duplicate_reports_conflicting_rule(pool: PgPool) {
    let existing = common::create_rule(&pool, "/old/", None, "/new/", None, "Permanent").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "old", "to_path": "/elsewhere/" }))
        .await;

    assert_eq!(response.status_code(), 400);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "A redirect for this URL already exists");

    let finding = &body["error"]["details"]["findings"][0];
    assert_eq!(finding["kind"], "duplicate_redirect");
    assert_eq!(finding["conflicting_id"], existing);
    assert_eq!(finding["href"], format!("/api/redirects/{}", existing));

    assert_eq!(common::count_rules(&pool).await, 1);
}

#[sqlx::test]
async fn test_create_reports_every_finding(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "https://example.com/", "to_path": "" }))
        .await;

    assert_eq!(response.status_code(), 400);

    let body = response.json::<Value>();
    let findings = body["error"]["details"]["findings"].as_array().unwrap();
    let sides: Vec<&str> = findings
        .iter()
        .filter(|f| f["kind"] == "malformed_field")
        .filter_map(|f| f["side"].as_str())
        .collect();

    assert!(sides.contains(&"from"));
    assert!(sides.contains(&"to"));
    assert_eq!(common::count_rules(&pool).await, 0);
}

#[sqlx::test]
async fn test_create_with_missing_node_is_rejected(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "/old/", "to_node_id": 999999 }))
        .await;

    assert_eq!(response.status_code(), 400);

    let finding = &response.json::<Value>()["error"]["details"]["findings"][0];
    assert_eq!(finding["kind"], "malformed_field");
    assert_eq!(finding["side"], "to");
}

#[sqlx::test]
async fn test_get_resolves_node_links(pool: PgPool) {
    let node = common::create_node(&pool, "products/widget/").await;
    let id = common::create_rule(&pool, "/widget/", None, "", Some(node), "Vanity").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .get(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["id"], id);
    assert_eq!(body["to_node_id"], node);
    assert_eq!(body["to_link"], "/products/widget/");
    assert_eq!(body["status_code"], 302);
}

#[sqlx::test]
async fn test_get_missing_rule_is_not_found(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .get("/api/redirects/424242")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_list_filters_and_paginates(pool: PgPool) {
    common::create_rule(&pool, "/blog/one/", None, "/news/one/", None, "Permanent").await;
    common::create_rule(&pool, "/blog/two/", None, "/news/two/", None, "Vanity").await;
    common::create_rule(&pool, "/shop/", None, "https://shop.example.com", None, "Permanent").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .get("/api/redirects?from=blog&page_size=10")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total_items"], 2);
    assert_eq!(body["pagination"]["total_pages"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let response = server
        .get("/api/redirects?type=vanity")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total_items"], 1);
    assert_eq!(body["items"][0]["from_path"], "/blog/two/");
}

#[sqlx::test]
async fn test_list_rejects_bad_parameters(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .get("/api/redirects?page_size=5")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .get("/api/redirects?type=temporary")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[sqlx::test]
async fn test_update_switches_target_to_node(pool: PgPool) {
    let node = common::create_node(&pool, "/catalog/").await;
    let (_state, server) = common::admin_server(&pool).await;

    let created = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "/old/", "to_path": "/new/" }))
        .await
        .json::<Value>();
    let id = created["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "to_node_id": node }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["to_path"], "");
    assert_eq!(body["to_node_id"], node);
    assert_eq!(body["from_path"], "/old/");

    let redirect = server.get("/old/").await;
    assert_eq!(redirect.header("location"), "/catalog/");
}

#[sqlx::test]
async fn test_update_null_node_clears_binding(pool: PgPool) {
    let node = common::create_node(&pool, "/catalog/").await;
    let id = common::create_rule(&pool, "", Some(node), "/new/", None, "Permanent").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .patch(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_node_id": null, "from_path": "/legacy/" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["from_node_id"], Value::Null);
    assert_eq!(body["from_path"], "/legacy/");
}

#[sqlx::test]
async fn test_update_missing_rule_is_not_found(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .patch("/api/redirects/424242")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "to_path": "/x/" }))
        .await;

    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_update_keeping_own_source_is_not_a_duplicate(pool: PgPool) {
    let id = common::create_rule(&pool, "/old/", None, "/new/", None, "Permanent").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .patch(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "redirect_type": "Vanity" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status_code"], 302);
}

#[sqlx::test]
async fn test_delete_stops_redirecting(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let created = server
        .post("/api/redirects")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "/old/", "to_path": "/new/" }))
        .await
        .json::<Value>();
    let id = created["id"].as_i64().unwrap();

    assert_eq!(server.get("/old/").await.status_code(), 301);

    let response = server
        .delete(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    assert_eq!(response.status_code(), 204);
    server.get("/old/").await.assert_status_not_found();

    let response = server
        .delete(&format!("/api/redirects/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_validate_does_not_persist(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects/validate")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "old", "to_path": "new" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["valid"], true);
    assert_eq!(body["findings"].as_array().unwrap().len(), 0);
    assert_eq!(body["normalized"]["from_path"], "/old/");
    assert_eq!(body["normalized"]["to_path"], "/new/");

    assert_eq!(common::count_rules(&pool).await, 0);
}

#[sqlx::test]
async fn test_validate_existing_rule_reports_duplicate(pool: PgPool) {
    common::create_rule(&pool, "/taken/", None, "/a/", None, "Permanent").await;
    let id = common::create_rule(&pool, "/mine/", None, "/b/", None, "Permanent").await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post(&format!("/api/redirects/validate?id={}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&json!({ "from_path": "/taken/" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["valid"], false);
    assert_eq!(body["findings"][0]["kind"], "duplicate_redirect");
    assert_eq!(body["normalized"]["id"], id);
}

#[sqlx::test]
async fn test_cache_rebuild_picks_up_direct_inserts(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    common::create_rule(&pool, "/direct/", None, "/target/", None, "Permanent").await;
    server.get("/direct/").await.assert_status_not_found();

    let response = server
        .post("/api/cache/rebuild")
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["entries"], 1);

    assert_eq!(server.get("/direct/").await.status_code(), 301);
}

#[sqlx::test]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server.get("/api/redirects").await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[sqlx::test]
async fn test_unknown_token_is_unauthorized(pool: PgPool) {
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .get("/api/redirects")
        .add_header("Authorization", bearer("not-a-real-token"))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[sqlx::test]
async fn test_token_without_permission_is_forbidden(pool: PgPool) {
    common::create_token(&pool, "reader", "reader-token", &[]).await;
    let (_state, server) = common::admin_server(&pool).await;

    let response = server
        .post("/api/redirects")
        .add_header("Authorization", bearer("reader-token"))
        .json(&json!({ "from_path": "/old/", "to_path": "/new/" }))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(common::count_rules(&pool).await, 0);
}
