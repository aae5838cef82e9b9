//! End-to-end tests against the in-process router

mod common;

use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::DateTime;
use tower::ServiceExt;

use ::common::prelude::Authenticator;
use filegate::service_state::StateSetupError;
use filegate::{ServiceConfig, ServiceState};

use crate::common::{fixture, get, login, send, write_file, SECRET};

fn path_token(issued_at: i64) -> String {
    Authenticator::derive_path_token(SECRET, DateTime::from_timestamp(issued_at, 0).unwrap())
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let fx = fixture(Some(SECRET), |_| {}).await;

    let reply = get(&fx.router, "/setCookie?password=nope", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.code(), -3);
    assert!(reply.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let fx = fixture(Some(SECRET), |_| {}).await;

    let reply = get(&fx.router, "/setCookie?password=hunter2", None).await;
    assert_eq!(reply.code(), 1);
    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("session_id="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(reply.json()["data"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_base_requires_session() {
    let fx = fixture(Some(SECRET), |config| {
        config.title = "Team Share".to_string();
        config.allow_mkdir = true;
    })
    .await;

    let reply = get(&fx.router, "/base", None).await;
    assert_eq!(reply.code(), -3);

    let reply = get(&fx.router, "/base", Some("forged")).await;
    assert_eq!(reply.code(), -3);

    let (cookie, _) = login(&fx.router, SECRET).await;
    let reply = get(&fx.router, "/base", Some(&cookie)).await;
    assert_eq!(reply.code(), 1);
    let data = &reply.json()["data"];
    assert_eq!(data["title"], "Team Share");
    assert_eq!(data["isMkdir"], true);
    assert_eq!(data["isUpload"], false);
    assert_eq!(data["showHidden"], true);
}

#[tokio::test]
async fn test_query_lists_directories_first() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    write_file(fx.root.path(), "b.txt", b"hello");
    write_file(fx.root.path(), ".hidden", b"");
    write_file(fx.root.path(), "zeta/inner.txt", b"x");

    let (cookie, _) = login(&fx.router, SECRET).await;

    let reply = get(&fx.router, "/query?filePath=&showHidden=false", Some(&cookie)).await;
    assert_eq!(reply.code(), 1);
    let entries = reply.json()["data"].as_array().unwrap().clone();
    let names: Vec<_> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["zeta", "b.txt"]);

    assert_eq!(entries[0]["type"], "dir");
    assert_eq!(entries[0]["fileType"], "folder");
    assert_eq!(entries[1]["type"], "file");
    assert_eq!(entries[1]["fileType"], "txt");
    assert_eq!(entries[1]["size"], "5B");
    assert_eq!(entries[1]["bytes"], 5);
    assert_eq!(entries[1]["modified"].as_str().unwrap().len(), 19);

    let reply = get(&fx.router, "/query?filePath=&showHidden=true", Some(&cookie)).await;
    assert_eq!(reply.json()["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_query_rejects_traversal() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    let (cookie, _) = login(&fx.router, SECRET).await;

    let reply = get(&fx.router, "/query?filePath=../", Some(&cookie)).await;
    assert_eq!(reply.code(), -1);
}

#[tokio::test]
async fn test_download_file_with_path_token() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    write_file(fx.root.path(), "docs/report.txt", b"quarterly numbers");

    let (_, issued_at) = login(&fx.router, SECRET).await;
    let token = path_token(issued_at);

    let reply = get(
        &fx.router,
        &format!("/download/{}/docs/report.txt", token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(&reply.body[..], b"quarterly numbers");
    let disposition = reply.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("filename=\"report.txt\""));
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    let (_, issued_at) = login(&fx.router, SECRET).await;

    let reply = get(
        &fx.router,
        &format!("/download/{}/nothing-here.txt", path_token(issued_at)),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_folder_as_archive() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    write_file(fx.root.path(), "photos/a.txt", b"alpha");
    write_file(fx.root.path(), "photos/sub/b.txt", b"bravo");

    let (_, issued_at) = login(&fx.router, SECRET).await;
    let reply = get(
        &fx.router,
        &format!("/download/{}/pkgDir_photos.zip", path_token(issued_at)),
        None,
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/zip");
    assert!(reply.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("filename=\"photos.zip\""));

    let mut archive = zip::ZipArchive::new(Cursor::new(reply.body.to_vec())).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "sub/b.txt"]);

    let mut contents = String::new();
    archive
        .by_name("sub/b.txt")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "bravo");

    // the staged archive is gone once the body has been consumed
    assert_eq!(std::fs::read_dir(fx.scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_root_archive_is_named_root_zip() {
    let fx = fixture(None, |_| {}).await;
    write_file(fx.root.path(), "top.txt", b"t");

    let reply = get(&fx.router, "/download/anything/pkgDir_.zip", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("filename=\"root.zip\""));

    let archive = zip::ZipArchive::new(Cursor::new(reply.body.to_vec())).unwrap();
    assert_eq!(archive.len(), 1);
}

#[tokio::test]
async fn test_download_with_bad_token_is_forbidden() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    write_file(fx.root.path(), "a.txt", b"alpha");
    login(&fx.router, SECRET).await;

    let reply = get(&fx.router, "/download/deadbeef/a.txt", None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.code(), -3);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    let (_, issued_at) = login(&fx.router, SECRET).await;

    let reply = get(
        &fx.router,
        &format!("/download/{}/%2E%2E/secret.txt", path_token(issued_at)),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_disabled_by_default() {
    let fx = fixture(Some(SECRET), |_| {}).await;
    write_file(fx.root.path(), "keep.txt", b"precious");
    let (cookie, _) = login(&fx.router, SECRET).await;

    let reply = get(
        &fx.router,
        "/delete?filePath=&fileName=keep.txt",
        Some(&cookie),
    )
    .await;
    assert_eq!(reply.code(), -2);
    assert!(fx.root.path().join("keep.txt").exists());
}

#[tokio::test]
async fn test_delete_checks_session_before_feature() {
    let fx = fixture(Some(SECRET), |_| {}).await;

    let reply = get(&fx.router, "/delete?filePath=&fileName=keep.txt", None).await;
    assert_eq!(reply.code(), -3);
}

#[tokio::test]
async fn test_delete_enabled_removes_file() {
    let fx = fixture(Some(SECRET), |config| config.allow_delete = true).await;
    write_file(fx.root.path(), "tmp/old.log", b"stale");
    let (cookie, _) = login(&fx.router, SECRET).await;

    let reply = get(
        &fx.router,
        "/delete?filePath=tmp&fileName=old.log",
        Some(&cookie),
    )
    .await;
    assert_eq!(reply.code(), 1);
    assert!(!fx.root.path().join("tmp").join("old.log").exists());

    let reply = get(
        &fx.router,
        "/delete?filePath=tmp&fileName=..",
        Some(&cookie),
    )
    .await;
    assert_eq!(reply.code(), -1);
    assert!(fx.root.path().join("tmp").exists());
}

#[tokio::test]
async fn test_mkdir_enabled_creates_directory() {
    let fx = fixture(Some(SECRET), |config| config.allow_mkdir = true).await;
    let (cookie, _) = login(&fx.router, SECRET).await;

    let reply = get(&fx.router, "/createDir?dirPath=new-folder", Some(&cookie)).await;
    assert_eq!(reply.code(), 1);
    assert!(fx.root.path().join("new-folder").is_dir());

    let reply = get(&fx.router, "/createDir?dirPath=new-folder", Some(&cookie)).await;
    assert_eq!(reply.code(), -1);
}

#[tokio::test]
async fn test_upload_stores_file_under_target_dir() {
    let fx = fixture(Some(SECRET), |config| config.allow_upload = true).await;
    std::fs::create_dir(fx.root.path().join("inbox")).unwrap();
    let (cookie, _) = login(&fx.router, SECRET).await;

    let boundary = "filegate-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"filePath\"\r\n\r\n\
         inbox\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         uploaded body\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::COOKIE, format!("session_id={}", cookie))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let reply = send(&fx.router, request).await;
    assert_eq!(reply.code(), 1, "{:?}", reply.json());
    assert_eq!(
        std::fs::read(fx.root.path().join("inbox").join("note.txt")).unwrap(),
        b"uploaded body"
    );
}

#[tokio::test]
async fn test_auth_disabled_mode_allows_everything() {
    let fx = fixture(None, |_| {}).await;
    write_file(fx.root.path(), "open.txt", b"public");

    let reply = get(&fx.router, "/setCookie?password=whatever", None).await;
    assert_eq!(reply.code(), 1);
    assert!(reply.headers.get(header::SET_COOKIE).is_none());

    let reply = get(&fx.router, "/base", None).await;
    assert_eq!(reply.code(), 1);

    let reply = get(&fx.router, "/download/whatever/open.txt", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(&reply.body[..], b"public");
}

#[tokio::test]
async fn test_health_routes() {
    let fx = fixture(None, |_| {}).await;

    let reply = get(&fx.router, "/_status/livez", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], "ok");

    let reply = get(&fx.router, "/_status/readyz", None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = get(&fx.router, "/_status/version", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.json()["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let fx = fixture(None, |_| {}).await;

    let reply = get(&fx.router, "/no/such/page", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_dir_serves_front_end() {
    let assets = tempfile::tempdir().unwrap();
    write_file(assets.path(), "index.html", b"<h1>files</h1>");
    let assets_dir = assets.path().to_path_buf();

    let fx = fixture(None, move |config| config.static_dir = Some(assets_dir)).await;

    let reply = get(&fx.router, "/", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(&reply.body[..], b"<h1>files</h1>");

    let reply = get(&fx.router, "/missing.js", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_archive_failure_is_server_error() {
    let fx = fixture(None, |_| {}).await;
    write_file(fx.root.path(), "d/a.txt", b"alpha");
    std::os::unix::fs::symlink(
        fx.root.path().join("d").join("gone"),
        fx.root.path().join("d").join("broken"),
    )
    .unwrap();

    let reply = get(&fx.router, "/download/anything/pkgDir_d.zip", None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&reply.body[..], b"archive failed");
    assert_eq!(std::fs::read_dir(fx.scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_error_body_has_no_server_paths() {
    let fx = fixture(None, |_| {}).await;

    let reply = get(&fx.router, "/download/anything/pkgDir_missing.zip", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    let body = String::from_utf8(reply.body.to_vec()).unwrap();
    assert_eq!(body, "directory not found");
    assert!(!body.contains(&*fx.root.path().to_string_lossy()));
}

#[tokio::test]
async fn test_download_archive_removed_when_response_dropped() {
    let fx = fixture(None, |_| {}).await;
    write_file(fx.root.path(), "photos/a.txt", b"alpha");

    let request = Request::builder()
        .uri("/download/anything/pkgDir_photos.zip")
        .body(Body::empty())
        .unwrap();
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(std::fs::read_dir(fx.scratch.path()).unwrap().count(), 1);

    // client went away before reading the body
    drop(response);
    assert_eq!(std::fs::read_dir(fx.scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_archive_dir_inside_root_is_refused() {
    let root = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        root_dir: root.path().to_path_buf(),
        archive_dir: Some(root.path().join("scratch")),
        ..ServiceConfig::default()
    };

    let result = ServiceState::from_config(&config).await;
    assert!(matches!(
        result,
        Err(StateSetupError::ArchiveDirInsideRoot(_))
    ));
}

#[tokio::test]
async fn test_default_archive_dir_stays_outside_root() {
    let root = std::env::temp_dir();
    let config = ServiceConfig {
        root_dir: root.clone(),
        archive_dir: None,
        ..ServiceConfig::default()
    };

    match ServiceState::from_config(&config).await {
        Ok(state) => assert!(!state.archive_dir().starts_with(state.root_dir())),
        Err(StateSetupError::NoArchiveDir(_)) => {}
        Err(e) => panic!("unexpected setup error: {}", e),
    }
}

fn multipart_upload(boundary: &str, cookie: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::COOKIE, format!("session_id={}", cookie))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_replaces_existing_file() {
    let fx = fixture(Some(SECRET), |config| config.allow_upload = true).await;
    write_file(fx.root.path(), "note.txt", b"old contents");
    let (cookie, _) = login(&fx.router, SECRET).await;

    let boundary = "filegate-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\r\n\
         new contents\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let reply = send(&fx.router, multipart_upload(boundary, &cookie, body)).await;
    assert_eq!(reply.code(), 1, "{:?}", reply.json());
    assert_eq!(
        std::fs::read(fx.root.path().join("note.txt")).unwrap(),
        b"new contents"
    );
    let leftovers = std::fs::read_dir(fx.root.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[tokio::test]
async fn test_broken_upload_keeps_existing_file() {
    let fx = fixture(Some(SECRET), |config| config.allow_upload = true).await;
    write_file(fx.root.path(), "note.txt", b"old contents");
    let (cookie, _) = login(&fx.router, SECRET).await;

    // the stream ends mid-field, without a closing boundary
    let boundary = "filegate-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\r\n\
         half of the new",
        b = boundary
    );

    let reply = send(&fx.router, multipart_upload(boundary, &cookie, body)).await;
    assert_eq!(reply.code(), -1);
    assert_eq!(
        std::fs::read(fx.root.path().join("note.txt")).unwrap(),
        b"old contents"
    );
    let leftovers = std::fs::read_dir(fx.root.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}
