use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::{middleware, response::Response};

fn apply_cors(resp: &mut Response) {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

pub(super) async fn cors_middleware(
    req: axum::http::Request<Body>,
    next: middleware::Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = Response::new(Body::empty());
        *resp.status_mut() = StatusCode::NO_CONTENT;
        apply_cors(&mut resp);
        return resp;
    }

    let mut resp = next.run(req).await;
    apply_cors(&mut resp);
    resp
}
