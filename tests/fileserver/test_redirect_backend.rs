//! Delivery through the accelerated redirect backend.

use actix_web::http::StatusCode;
use actix_web::test;
use media_fileserver_lib::config::BackendKind;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_redirect_emits_internal_url_with_empty_body() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "docs/report.pdf", b"%PDF-1.7");
    let app = create_test_app(&dirs, BackendKind::Redirect, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/docs/report.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        header_str(&resp, "x-accel-redirect"),
        Some("/media/docs/report.pdf")
    );
    assert_eq!(header_str(&resp, "content-type"), Some("application/pdf"));
    assert_eq!(
        header_str(&resp, "content-disposition"),
        Some("inline; filename=\"report.pdf\"")
    );

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_rt::test]
async fn test_redirect_percent_encodes_segments() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "my photos/été.png", b"\x89PNG");
    let app = create_test_app(&dirs, BackendKind::Redirect, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/my%20photos/%C3%A9t%C3%A9.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        header_str(&resp, "x-accel-redirect"),
        Some("/media/my%20photos/%C3%A9t%C3%A9.png")
    );
}

#[actix_rt::test]
async fn test_protected_redirect_uses_protected_prefix() {
    let dirs = MediaDirs::new();
    write_file(dirs.protected.path(), "account/1/badge.txt", b"badge");
    let app = create_test_app(&dirs, BackendKind::Redirect, Some(sample_records())).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/protected/account/badge/1")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        header_str(&resp, "x-accel-redirect"),
        Some("/protected/account/1/badge.txt")
    );
}

#[actix_rt::test]
async fn test_video_streams_locally_under_redirect_backend() {
    let dirs = MediaDirs::new();
    let content = patterned(300);
    write_file(dirs.public.path(), "clip.mp4", &content);
    let app = create_test_app(&dirs, BackendKind::Redirect, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/clip.mp4")
        .insert_header(("Range", "bytes=100-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert!(resp.headers().get("x-accel-redirect").is_none());
    assert_eq!(header_str(&resp, "content-range"), Some("bytes 100-299/300"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], &content[100..]);
}

#[actix_rt::test]
async fn test_redirect_missing_file_is_not_found() {
    let dirs = MediaDirs::new();
    let app = create_test_app(&dirs, BackendKind::Redirect, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/missing.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().get("x-accel-redirect").is_none());
}
