//! Router tests for post CRUD

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::routes::create_router;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::in_memory();
        config.auth.bcrypt_cost = 4;
        config
    }

    fn create_app(config: AppConfig) -> Router {
        create_router(AppState::in_memory(config))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json, set_cookie)
    }

    async fn create_post(app: &Router, body: Value) -> Value {
        let (status, json, _) = send(app, "POST", "/api/v1/posts", Some(body), None).await;
        assert_eq!(status, StatusCode::OK);
        json["data"]["post"].clone()
    }

    #[tokio::test]
    async fn test_create_get_delete_scenario() {
        let app = create_app(test_config());

        let post = create_post(&app, json!({ "title": "t", "body": "b" })).await;
        let id = post["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/posts/{}", id);

        let (status, body, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "success", "data": { "post": { "title": "t", "body": "b", "id": id } } })
        );

        let (status, body, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success" }));

        let (status, body, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "data": { "post": null } }));
    }

    #[tokio::test]
    async fn test_list_counts_posts() {
        let app = create_app(test_config());

        let (_, body, _) = send(&app, "GET", "/api/v1/posts", None, None).await;
        assert_eq!(body, json!({ "status": "success", "results": 0, "data": { "posts": [] } }));

        create_post(&app, json!({ "title": "a", "body": "1" })).await;
        create_post(&app, json!({ "title": "b", "body": "2" })).await;

        let (status, body, _) = send(&app, "GET", "/api/v1/posts", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], 2);
        assert_eq!(body["data"]["posts"][0]["title"], "a");
        assert_eq!(body["data"]["posts"][1]["title"], "b");
    }

    #[tokio::test]
    async fn test_patch_and_put_merge_fields() {
        let app = create_app(test_config());
        let post = create_post(&app, json!({ "title": "t", "body": "b", "tag": "x" })).await;
        let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

        let (status, body, _) =
            send(&app, "PATCH", &uri, Some(json!({ "body": "edited" })), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["post"]["body"], "edited");
        assert_eq!(body["data"]["post"]["title"], "t");
        assert_eq!(body["data"]["post"]["tag"], "x");

        let (status, body, _) = send(&app, "PUT", &uri, Some(json!({ "tag": "y" })), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["post"]["tag"], "y");
        assert_eq!(body["data"]["post"]["body"], "edited");
    }

    #[tokio::test]
    async fn test_missing_post_compat_shapes() {
        let app = create_app(test_config());
        let uri = format!("/api/v1/posts/{}", uuid::Uuid::new_v4());

        let (status, body, _) = send(&app, "PATCH", &uri, Some(json!({ "body": "x" })), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["post"], Value::Null);

        let (status, body, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success" }));
    }

    #[tokio::test]
    async fn test_invalid_writes_are_flattened() {
        let app = create_app(test_config());

        let (status, body, _) =
            send(&app, "POST", "/api/v1/posts", Some(json!({ "title": "t" })), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "failed" }));

        let (status, body, _) = send(&app, "GET", "/api/v1/posts/not-an-id", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "failed" }));

        let (status, _, _) = send(&app, "POST", "/api/v1/posts", Some(json!("text")), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strict_mode_reports_not_found() {
        let mut config = test_config();
        config.api.compat_mode = false;
        let app = create_app(config);
        let uri = format!("/api/v1/posts/{}", uuid::Uuid::new_v4());

        let (status, body, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "post not found");

        let (status, _, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body, _) =
            send(&app, "POST", "/api/v1/posts", Some(json!({ "body": "b" })), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "post must have a title");
    }

    const MISSING_POST: &str = "/api/v1/posts/00000000-0000-0000-0000-000000000000";

    #[rstest]
    #[case::get_missing_compat("GET", MISSING_POST, None, true, StatusCode::OK)]
    #[case::get_missing_strict("GET", MISSING_POST, None, false, StatusCode::NOT_FOUND)]
    #[case::delete_missing_compat("DELETE", MISSING_POST, None, true, StatusCode::OK)]
    #[case::delete_missing_strict("DELETE", MISSING_POST, None, false, StatusCode::NOT_FOUND)]
    #[case::put_missing_strict("PUT", MISSING_POST, Some(json!({ "body": "x" })), false, StatusCode::NOT_FOUND)]
    #[case::bad_id_compat("GET", "/api/v1/posts/42", None, true, StatusCode::BAD_REQUEST)]
    #[case::bad_id_strict("GET", "/api/v1/posts/42", None, false, StatusCode::BAD_REQUEST)]
    #[case::no_title_compat("POST", "/api/v1/posts", Some(json!({ "body": "b" })), true, StatusCode::BAD_REQUEST)]
    #[case::no_title_strict("POST", "/api/v1/posts", Some(json!({ "body": "b" })), false, StatusCode::BAD_REQUEST)]
    #[case::blank_title_compat("POST", "/api/v1/posts", Some(json!({ "title": "   ", "body": "b" })), true, StatusCode::OK)]
    #[case::blank_title_strict("POST", "/api/v1/posts", Some(json!({ "title": "   ", "body": "b" })), false, StatusCode::OK)]
    #[tokio::test]
    async fn test_status_by_mode(
        #[case] method: &str,
        #[case] uri: &str,
        #[case] body: Option<Value>,
        #[case] compat_mode: bool,
        #[case] expected: StatusCode,
    ) {
        let mut config = test_config();
        config.api.compat_mode = compat_mode;
        let app = create_app(config);

        let (status, json, _) = send(&app, method, uri, body, None).await;

        assert_eq!(status, expected);
        let outcome = if expected.is_success() { "success" } else { "failed" };
        assert_eq!(json["status"], outcome);
    }

    #[tokio::test]
    async fn test_protected_writes_require_session() {
        let mut config = test_config();
        config.api.protect_posts = true;
        let app = create_app(config);
        let new_post = json!({ "title": "t", "body": "b" });

        let (status, body, _) =
            send(&app, "POST", "/api/v1/posts", Some(new_post.clone()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "failed", "message": "not logged in" }));

        let (status, _, _) =
            send(&app, "POST", "/api/v1/posts", Some(new_post.clone()), Some("sid=forged.00")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let creds = json!({ "username": "alice", "password": "pw1" });
        send(&app, "POST", "/api/v1/users/signup", Some(creds.clone()), None).await;
        let (_, _, cookie) = send(&app, "POST", "/api/v1/users/login", Some(creds), None).await;
        let cookie = cookie.unwrap();

        let (status, body, _) =
            send(&app, "POST", "/api/v1/posts", Some(new_post), Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["post"]["title"], "t");

        // Reads stay public
        let (status, _, _) = send(&app, "GET", "/api/v1/posts", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_route() {
        let app = create_app(test_config());
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Hi there"));
    }

    fn field_strategy() -> impl Strategy<Value = (String, String)> {
        ("[a-z]{1,8}", "[a-zA-Z0-9 ]{1,16}")
            .prop_filter("reserved key", |(k, _)| k != "id" && k != "title" && k != "body")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: a created post reads back with exactly the supplied fields
        #[test]
        fn prop_create_then_get_returns_supplied_fields(
            title in "[a-zA-Z0-9]{1,20}",
            body in "[a-zA-Z0-9]{1,40}",
            extra in proptest::collection::vec(field_strategy(), 0..4),
        ) {
            let mut doc = json!({ "title": title, "body": body });
            for (key, value) in &extra {
                doc[key] = json!(value);
            }

            let fetched = tokio_test::block_on(async {
                let app = create_app(test_config());
                let created = create_post(&app, doc.clone()).await;
                let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());
                let (_, body, _) = send(&app, "GET", &uri, None, None).await;
                body["data"]["post"].clone()
            });

            let mut fetched = fetched.as_object().cloned().unwrap();
            prop_assert!(fetched.remove("id").is_some());
            prop_assert_eq!(Value::Object(fetched), doc);
        }

        /// Property: list count equals created minus deleted
        #[test]
        fn prop_list_count_tracks_deletes(created in 0usize..6, deleted in 0usize..6) {
            let deleted = deleted.min(created);
            let results = tokio_test::block_on(async {
                let app = create_app(test_config());
                let mut ids = Vec::new();
                for i in 0..created {
                    let post = create_post(&app, json!({ "title": format!("t{}", i), "body": "b" })).await;
                    ids.push(post["id"].as_str().unwrap().to_string());
                }
                for id in ids.iter().take(deleted) {
                    send(&app, "DELETE", &format!("/api/v1/posts/{}", id), None, None).await;
                }
                let (_, body, _) = send(&app, "GET", "/api/v1/posts", None, None).await;
                body["results"].as_u64().unwrap()
            });

            prop_assert_eq!(results as usize, created - deleted);
        }
    }
}
