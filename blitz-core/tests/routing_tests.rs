//! Integration tests for routing

use blitz_core::{Error, HttpRequest, HttpResponse, MethodSlot, Router, get_params};

async fn echo_path(req: HttpRequest) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::text(req.path.clone()))
}

async fn echo_param(req: HttpRequest) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::text(get_params(&req).to_string()))
}

async fn send(router: &Router, method: &str, path: &str) -> HttpResponse {
    router.serve(HttpRequest::new(method, path)).await.unwrap()
}

#[tokio::test]
async fn test_static_route() {
    let mut router = Router::new();
    router.get(
        "/hello",
        |_req: HttpRequest| async {
            Ok::<_, Error>(HttpResponse::ok().with_body(b"Hello, World!".to_vec()))
        },
        vec![],
    );

    let response = send(&router, "GET", "/hello").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"Hello, World!");
}

#[tokio::test]
async fn test_leading_and_trailing_slashes_are_ignored() {
    let mut router = Router::new();
    router.get("users/", echo_path, vec![]);

    for path in ["/users", "users", "/users/", "//users//"] {
        assert_eq!(send(&router, "GET", path).await.status, 200, "{path}");
    }
}

#[tokio::test]
async fn test_path_parameter() {
    let mut router = Router::new();
    router.get(
        "/users/:id",
        |req: HttpRequest| async move {
            let id = req.param("id").unwrap_or_default().to_string();
            Ok::<_, Error>(HttpResponse::text(id))
        },
        vec![],
    );

    let response = send(&router, "GET", "/users/123").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body_str(), "123");
}

#[tokio::test]
async fn test_param_route_exposes_full_path() {
    let mut router = Router::new();
    router.get("/users/:id/posts/:post", echo_param, vec![]);

    let response = send(&router, "GET", "/users/1/posts/2").await;
    assert_eq!(response.body_str(), "users/1/posts/2");
}

#[tokio::test]
async fn test_query_parameters() {
    let mut router = Router::new();
    router.get(
        "/search",
        |req: HttpRequest| async move {
            let q = req.query("q").unwrap_or_default().to_string();
            Ok::<_, Error>(HttpResponse::text(q))
        },
        vec![],
    );

    let response = send(&router, "GET", "/search?q=rust&page=1").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body_str(), "rust");
}

#[tokio::test]
async fn test_wildcard_route_exposes_remainder() {
    let mut router = Router::new();
    router.get("/files/*", echo_param, vec![]);

    assert_eq!(
        send(&router, "GET", "/files/a/b.txt").await.body_str(),
        "a/b.txt"
    );
    assert_eq!(send(&router, "GET", "/files").await.body_str(), "");
    assert_eq!(send(&router, "GET", "/filesystem").await.status, 404);
}

#[tokio::test]
async fn test_wildcard_after_param_segment() {
    let mut router = Router::new();
    router.get(
        "/users/:id/files/*",
        |req: HttpRequest| async move {
            Ok::<_, Error>(HttpResponse::text(format!(
                "{}:{}",
                req.param("id").unwrap_or_default(),
                get_params(&req)
            )))
        },
        vec![],
    );
    router.any("*", echo_param, vec![]);

    assert_eq!(
        send(&router, "GET", "/users/5/files/a/b.txt").await.body_str(),
        "5:a/b.txt"
    );
    assert_eq!(
        send(&router, "GET", "/users/5/photos/a").await.body_str(),
        "users/5/photos/a"
    );
}

#[tokio::test]
async fn test_route_not_found() {
    let router = Router::new();
    let response = send(&router, "GET", "/nonexistent").await;

    assert_eq!(response.status, 404);
    assert_eq!(response.body_str(), "404 page not found");
}

#[tokio::test]
async fn test_method_mismatch_is_not_found() {
    let mut router = Router::new();
    router.post("/submit", echo_path, vec![]);

    assert_eq!(send(&router, "GET", "/submit").await.status, 404);
    assert_eq!(send(&router, "POST", "/submit").await.status, 200);
}

#[tokio::test]
async fn test_method_mismatch_falls_back_to_catch_all() {
    let mut router = Router::new();
    router.post("/submit", echo_path, vec![]);
    router.any("*", echo_param, vec![]);

    let response = send(&router, "GET", "/submit").await;
    assert_eq!(response.body_str(), "submit");
}

#[tokio::test]
async fn test_unknown_methods_are_not_found() {
    let mut router = Router::new();
    router.any("/x", echo_path, vec![]);
    router.any("*", echo_param, vec![]);

    assert_eq!(send(&router, "HEAD", "/x").await.status, 404);
    assert_eq!(send(&router, "TRACE", "/anything").await.status, 404);
}

#[tokio::test]
async fn test_explicit_any_slot() {
    let mut router = Router::new();
    router.handle(
        MethodSlot::Any,
        "/res",
        |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::text("any")) },
        vec![],
    );
    router.delete(
        "/res",
        |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::text("delete")) },
        vec![],
    );

    assert_eq!(send(&router, "DELETE", "/res").await.body_str(), "delete");
    assert_eq!(send(&router, "PUT", "/res").await.body_str(), "any");
    assert_eq!(send(&router, "HEAD", "/res").await.status, 404);
}

#[tokio::test]
async fn test_all_verbs() {
    let mut router = Router::new();
    router
        .get("/r", echo_path, vec![])
        .post("/r", echo_path, vec![])
        .put("/r", echo_path, vec![])
        .delete("/r", echo_path, vec![])
        .patch("/r", echo_path, vec![]);

    for method in ["GET", "POST", "PUT", "DELETE", "PATCH"] {
        assert_eq!(send(&router, method, "/r").await.status, 200, "{method}");
    }
    assert_eq!(router.route_count(), 1);
}
