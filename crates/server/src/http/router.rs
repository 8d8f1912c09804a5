use super::handlers::{admin, comments, likes, posts, sse, users};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/api/users/:user_id", put(users::upsert_profile))
        .route("/api/users/:user_id/posts", get(users::list_user_posts))
        .route("/api/posts", post(posts::create_post))
        .route("/api/posts/:post_id", get(posts::get_post))
        .route(
            "/api/posts/:post_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/posts/:post_id/events", get(sse::sse_handler))
        .route("/api/comments/:comment_id", delete(comments::delete_comment))
        .route("/api/comments/:comment_id/like", post(likes::toggle_like))
        .route("/api/admin/comments", get(admin::list_comments))
        .route("/api/admin/comments/suspended", get(admin::list_suspended))
        .route(
            "/api/admin/comments/:comment_id/suspend",
            post(admin::set_suspended),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommentSettings;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use crate::http::handlers::sse::{event_payload, is_for_post};
    use domain::CommentEvent;
    use serde_json::{json, Value};
    use std::time::Duration;
    use storage::Db;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    const ADMIN: &str = "test-admin";

    async fn test_state(comments: CommentSettings) -> AppState {
        let db = Db::new("sqlite::memory:").await.unwrap();
        let (events, _) = broadcast::channel(16);
        AppState {
            db,
            events,
            admin_token: ADMIN.to_string(),
            comments,
        }
    }

    async fn app_with(comments: CommentSettings) -> Router {
        build_router(test_state(comments).await, "*")
    }

    /// Router plus a subscriber that sees every published event.
    async fn app_with_events() -> (Router, broadcast::Receiver<CommentEvent>) {
        let state = test_state(CommentSettings::default()).await;
        let rx = state.events.subscribe();
        (build_router(state, "*"), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<CommentEvent>) -> Vec<CommentEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    async fn app() -> Router {
        app_with(CommentSettings::default()).await
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            req = req.header("X-User-Id", user);
        }
        if uri.starts_with("/api/admin") {
            req = req.header("Authorization", format!("Bearer {}", ADMIN));
        }
        let body = match body {
            Some(v) => {
                req = req.header("Content-Type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn json_of(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn new_post(app: &Router) -> String {
        let resp = send(
            app,
            Method::POST,
            "/api/posts",
            Some("alice"),
            Some(json!({ "title": "Hello", "body": "World" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        json_of(resp).await["id"].as_str().unwrap().to_string()
    }

    async fn comment(app: &Router, post: &str, user: &str, parent: Option<&str>) -> Response {
        send(
            app,
            Method::POST,
            &format!("/api/posts/{}/comments", post),
            Some(user),
            Some(json!({ "content": "nice post", "parentId": parent })),
        )
        .await
    }

    async fn comment_id(app: &Router, post: &str, user: &str, parent: Option<&str>) -> String {
        let resp = comment(app, post, user, parent).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        json_of(resp).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_post_detail_returns_threaded_comments() {
        let app = app().await;
        send(
            &app,
            Method::PUT,
            "/api/users/bob",
            Some("bob"),
            Some(json!({ "displayName": "Bob", "avatarUrl": null })),
        )
        .await;
        let post = new_post(&app).await;

        let top = comment_id(&app, &post, "bob", None).await;
        let reply = comment_id(&app, &post, "carol", Some(&top)).await;

        let resp = send(&app, Method::GET, &format!("/api/posts/{}", post), None, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_of(resp).await;

        assert_eq!(body["title"], "Hello");
        let comments = body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["id"], top.as_str());
        assert_eq!(comments[0]["author"]["displayName"], "Bob");
        assert_eq!(comments[0]["replies"][0]["id"], reply.as_str());
        assert_eq!(comments[0]["replies"][0]["author"]["displayName"], "Unknown");
        assert_eq!(comments[0]["replies"][0]["replies"], json!([]));
    }

    #[tokio::test]
    async fn test_reply_depth_is_limited() {
        let app = app_with(CommentSettings {
            max_depth: 2,
            ..CommentSettings::default()
        })
        .await;
        let post = new_post(&app).await;

        let first = comment_id(&app, &post, "bob", None).await;
        let second = comment_id(&app, &post, "bob", Some(&first)).await;

        let resp = comment(&app, &post, "bob", Some(&second)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_comment_rejections() {
        let app = app().await;
        let post = new_post(&app).await;

        let resp = comment(&app, &post, "bob", Some("no-such-parent")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = comment(&app, "no-such-post", "bob", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send(
            &app,
            Method::POST,
            &format!("/api/posts/{}/comments", post),
            Some("bob"),
            Some(json!({ "content": "   " })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(
            &app,
            Method::POST,
            &format!("/api/posts/{}/comments", post),
            None,
            Some(json!({ "content": "anonymous" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_comment_pages_hold_whole_threads() {
        let app = app().await;
        let post = new_post(&app).await;

        let older = comment_id(&app, &post, "bob", None).await;
        comment_id(&app, &post, "carol", Some(&older)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = comment_id(&app, &post, "dave", None).await;

        let uri = format!("/api/posts/{}/comments?page=1&per_page=1", post);
        let body = json_of(send(&app, Method::GET, &uri, None, None).await).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["perPage"], 1);
        assert_eq!(body["comments"][0]["id"], newer.as_str());

        let uri = format!("/api/posts/{}/comments?page=2&per_page=1", post);
        let body = json_of(send(&app, Method::GET, &uri, None, None).await).await;
        assert_eq!(body["comments"][0]["id"], older.as_str());
        assert_eq!(body["comments"][0]["replies"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_author_and_removes_subtree() {
        let app = app().await;
        let post = new_post(&app).await;
        let top = comment_id(&app, &post, "bob", None).await;
        comment_id(&app, &post, "carol", Some(&top)).await;

        let uri = format!("/api/comments/{}", top);
        let resp = send(&app, Method::DELETE, &uri, Some("carol"), None).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = send(&app, Method::DELETE, &uri, Some("bob"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_of(resp).await["deleted"].as_array().unwrap().len(), 2);

        let body = json_of(send(&app, Method::GET, &format!("/api/posts/{}", post), None, None).await).await;
        assert_eq!(body["comments"], json!([]));
    }

    #[tokio::test]
    async fn test_suspension_hides_comment_and_promotes_replies() {
        let app = app().await;
        let post = new_post(&app).await;
        let top = comment_id(&app, &post, "bob", None).await;
        let reply = comment_id(&app, &post, "carol", Some(&top)).await;

        let unauthorized = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/admin/comments/{}/suspend", top))
                    .header("Content-Type", "application/json")
                    .body(Body::from(json!({ "suspended": true }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(unauthorized.status(), StatusCode::FORBIDDEN);

        let resp = send(
            &app,
            Method::POST,
            &format!("/api/admin/comments/{}/suspend", top),
            None,
            Some(json!({ "suspended": true })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_of(send(&app, Method::GET, &format!("/api/posts/{}", post), None, None).await).await;
        let comments = body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["id"], reply.as_str());
        assert_eq!(comments[0]["parentId"], top.as_str());

        let suspended = json_of(send(&app, Method::GET, "/api/admin/comments/suspended", None, None).await).await;
        assert_eq!(suspended[0]["id"], top.as_str());

        let listing = json_of(send(&app, Method::GET, "/api/admin/comments", None, None).await).await;
        assert_eq!(listing["total"], 1);
    }

    #[tokio::test]
    async fn test_like_toggle_updates_tree_count() {
        let app = app().await;
        let post = new_post(&app).await;
        let top = comment_id(&app, &post, "bob", None).await;
        let uri = format!("/api/comments/{}/like", top);

        let liked = json_of(send(&app, Method::POST, &uri, Some("carol"), None).await).await;
        assert_eq!(liked, json!({ "liked": true, "likeCount": 1 }));

        let body = json_of(send(&app, Method::GET, &format!("/api/posts/{}", post), None, None).await).await;
        assert_eq!(body["comments"][0]["likeCount"], 1);

        let unliked = json_of(send(&app, Method::POST, &uri, Some("carol"), None).await).await;
        assert_eq!(unliked, json!({ "liked": false, "likeCount": 0 }));
    }

    #[tokio::test]
    async fn test_user_posts_listing_carries_trees() {
        let app = app().await;
        let post = new_post(&app).await;
        comment_id(&app, &post, "bob", None).await;

        let body = json_of(send(&app, Method::GET, "/api/users/alice/posts", None, None).await).await;
        let posts = body.as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["id"], post.as_str());
        assert_eq!(posts[0]["comments"].as_array().unwrap().len(), 1);

        let empty = json_of(send(&app, Method::GET, "/api/users/nobody/posts", None, None).await).await;
        assert_eq!(empty, json!([]));
    }

    #[tokio::test]
    async fn test_admin_listing_promotes_reply_split_from_parent() {
        let app = app().await;
        let post = new_post(&app).await;
        let top = comment_id(&app, &post, "bob", None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let reply = comment_id(&app, &post, "carol", Some(&top)).await;

        let first = json_of(send(&app, Method::GET, "/api/admin/comments?per_page=1", None, None).await).await;
        assert_eq!(first["total"], 2);
        let comments = first["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["id"], reply.as_str());
        assert_eq!(comments[0]["parentId"], top.as_str());

        let second = json_of(
            send(&app, Method::GET, "/api/admin/comments?page=2&per_page=1", None, None).await,
        )
        .await;
        assert_eq!(second["comments"][0]["id"], top.as_str());
        assert_eq!(second["comments"][0]["replies"], json!([]));
    }

    #[tokio::test]
    async fn test_mutations_publish_live_events() {
        let (app, mut rx) = app_with_events().await;
        let post = new_post(&app).await;
        let other = new_post(&app).await;

        let top = comment_id(&app, &post, "bob", None).await;
        let reply = comment_id(&app, &post, "carol", Some(&top)).await;
        comment_id(&app, &other, "dave", None).await;
        let resp = send(&app, Method::POST, &format!("/api/comments/{}/like", top), Some("carol"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = send(&app, Method::DELETE, &format!("/api/comments/{}", top), Some("bob"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 5);

        let stream: Vec<(&str, Value)> = events
            .iter()
            .filter(|e| is_for_post(e, &post))
            .map(|e| event_payload(e).unwrap())
            .collect();
        let names: Vec<&str> = stream.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["new_comment", "new_comment", "like_comment", "delete_comment"]
        );

        assert_eq!(stream[0].1["id"], top.as_str());
        assert_eq!(stream[1].1["parentId"], top.as_str());
        assert_eq!(stream[2].1, json!({ "id": top.as_str(), "likeCount": 1 }));

        let mut deleted: Vec<String> = stream[3].1["ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        deleted.sort();
        let mut expected = vec![top.clone(), reply.clone()];
        expected.sort();
        assert_eq!(deleted, expected);

        let elsewhere: Vec<&CommentEvent> = events.iter().filter(|e| is_for_post(e, &other)).collect();
        assert_eq!(elsewhere.len(), 1);
        assert_eq!(event_payload(elsewhere[0]).unwrap().0, "new_comment");
    }

    #[tokio::test]
    async fn test_suspension_publishes_removal_once() {
        let (app, mut rx) = app_with_events().await;
        let post = new_post(&app).await;
        let top = comment_id(&app, &post, "bob", None).await;
        drain(&mut rx);

        let uri = format!("/api/admin/comments/{}/suspend", top);
        for _ in 0..2 {
            let resp = send(&app, Method::POST, &uri, None, Some(json!({ "suspended": true }))).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(is_for_post(&events[0], &post));
        let (name, data) = event_payload(&events[0]).unwrap();
        assert_eq!(name, "delete_comment");
        assert_eq!(data, json!({ "ids": [top] }));

        let resp = send(&app, Method::POST, &uri, None, Some(json!({ "suspended": false }))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(drain(&mut rx).is_empty());
    }
}
