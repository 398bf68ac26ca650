//! Dispatcher behavior across the compiled and uncompiled paths

use blitz_core::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn text(body: &'static str) -> BoxedHandler {
    handler(move |_req: HttpRequest| async move {
        Ok::<_, Error>(HttpResponse::text(body))
    })
}

fn catch_all_echo() -> BoxedHandler {
    handler(|req: HttpRequest| async move {
        Ok::<_, Error>(HttpResponse::text(format!("catch:{}", get_params(&req))))
    })
}

#[tokio::test]
async fn test_uncompiled_router_resolves_all_partitions() {
    let mut router = Router::new();
    router.get("/users/:id", text("user"), vec![]);
    router.get("/assets/*", text("asset"), vec![]);
    router.catch_all(catch_all_echo(), vec![]);
    assert!(!router.is_compiled());

    let user = router
        .serve(HttpRequest::new("GET", "/users/5"))
        .await
        .unwrap();
    assert_eq!(user.body_str(), "user");

    let asset = router
        .serve(HttpRequest::new("GET", "/assets/app.js"))
        .await
        .unwrap();
    assert_eq!(asset.body_str(), "asset");

    let other = router.serve(HttpRequest::new("GET", "/x/y")).await.unwrap();
    assert_eq!(other.body_str(), "catch:x/y");
}

#[tokio::test]
async fn test_compiled_and_uncompiled_agree() {
    let mut uncompiled = Router::new();
    uncompiled.get("/users/:id", text("user"), vec![]);
    uncompiled.catch_all(catch_all_echo(), vec![]);

    let mut compiled = Router::new();
    compiled.get("/users/:id", text("user"), vec![]);
    compiled.catch_all(catch_all_echo(), vec![]);
    compiled.get("/unrelated", text("static"), vec![]);

    assert!(!uncompiled.is_compiled());
    assert!(compiled.is_compiled());

    for path in ["/users/9", "/users", "/a/b/c", "/"] {
        let left = uncompiled
            .serve(HttpRequest::new("GET", path))
            .await
            .unwrap();
        let right = compiled.serve(HttpRequest::new("GET", path)).await.unwrap();
        assert_eq!(left, right, "{path}");
    }
}

#[tokio::test]
async fn test_registration_after_compile_is_visible() {
    let mut router = Router::new();
    router.get("/a", text("a"), vec![]);
    assert!(router.is_compiled());

    router.get("/b", text("b"), vec![]);
    router.catch_all(catch_all_echo(), vec![]);

    let b = router.serve(HttpRequest::new("GET", "/b")).await.unwrap();
    assert_eq!(b.body_str(), "b");
    let c = router.serve(HttpRequest::new("GET", "/c")).await.unwrap();
    assert_eq!(c.body_str(), "catch:c");
}

#[tokio::test]
async fn test_options_on_empty_router() {
    let router = Router::new();
    let response = router
        .serve(HttpRequest::new("OPTIONS", "/anything/at/all"))
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(
        response.header("Allow"),
        Some("GET,POST,PUT,DELETE,PATCH,OPTIONS")
    );
}

#[tokio::test]
async fn test_options_does_not_reach_handlers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counting = {
        let hits = hits.clone();
        handler(move |_req: HttpRequest| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(HttpResponse::ok())
            }
        })
    };

    let mut router = Router::new();
    router.any("/x", counting.clone(), vec![]);
    router.catch_all(counting, vec![]);

    let response = router
        .serve(HttpRequest::new("OPTIONS", "/x"))
        .await
        .unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_options_disabled_by_configuration() {
    let mut router = Router::with_options(RouterOptions::new().auto_options(false));
    router.catch_all(catch_all_echo(), vec![]);

    let response = router
        .serve(HttpRequest::new("OPTIONS", "/x"))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_frozen_dispatcher_serves_concurrently() {
    let mut router = Router::new();
    router.get("/api", text("Welcome"), vec![]);
    router.catch_all(catch_all_echo(), vec![]);
    let dispatcher = router.freeze();

    let mut tasks = Vec::new();
    for i in 0..32 {
        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            let path = if i % 2 == 0 { "/api".to_string() } else { format!("/p{i}") };
            dispatcher.serve(HttpRequest::new("GET", path)).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let body = task.await.unwrap().unwrap().body_str();
        if i % 2 == 0 {
            assert_eq!(body, "Welcome");
        } else {
            assert_eq!(body, format!("catch:p{i}"));
        }
    }
}

#[tokio::test]
async fn test_handler_errors_are_not_caught() {
    let mut router = Router::new();
    router.get(
        "/boom",
        |_req: HttpRequest| async { Err::<HttpResponse, _>(Error::Internal("boom".into())) },
        vec![logger()],
    );

    let err = router
        .serve(HttpRequest::new("GET", "/boom"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);

    let rendered = err.into_response();
    assert_eq!(rendered.status, 500);
}
