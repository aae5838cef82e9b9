//! Shared helpers for driving the router in-process
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use filegate::{ServiceConfig, ServiceState};

pub const SECRET: &str = "hunter2";

/// A served tree plus the scratch dir archives are staged in
pub struct Fixture {
    pub root: TempDir,
    pub scratch: TempDir,
    pub router: Router,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn code(&self) -> i64 {
        self.json()["code"].as_i64().unwrap()
    }
}

pub async fn fixture(auth_code: Option<&str>, tweak: impl FnOnce(&mut ServiceConfig)) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let mut config = ServiceConfig {
        root_dir: root.path().to_path_buf(),
        archive_dir: Some(scratch.path().to_path_buf()),
        auth_code: auth_code.map(str::to_string),
        ..ServiceConfig::default()
    };
    tweak(&mut config);

    let state = ServiceState::from_config(&config).await.unwrap();
    Fixture {
        root,
        scratch,
        router: filegate::http_server::router(state),
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = relative
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> Reply {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, format!("session_id={}", cookie));
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

/// Log in and return the session cookie value with the issue timestamp
pub async fn login(router: &Router, password: &str) -> (String, i64) {
    let reply = get(router, &format!("/setCookie?password={}", password), None).await;
    assert_eq!(reply.code(), 1, "login failed: {:?}", reply.json());

    let set_cookie = reply
        .headers
        .get(header::SET_COOKIE)
        .expect("login sets a cookie")
        .to_str()
        .unwrap()
        .to_string();
    let pair = set_cookie.split(';').next().unwrap();
    let token = pair.strip_prefix("session_id=").unwrap().to_string();
    let issued_at = reply.json()["data"].as_i64().unwrap();
    (token, issued_at)
}
