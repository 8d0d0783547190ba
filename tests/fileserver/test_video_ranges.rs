//! Byte-range streaming of video files.

use actix_web::http::StatusCode;
use actix_web::test;
use media_fileserver_lib::config::BackendKind;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_video_without_range_starts_at_zero() {
    let dirs = MediaDirs::new();
    let content = patterned(1000);
    write_file(dirs.public.path(), "clip.mp4", &content);
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/clip.mp4")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&resp, "content-type"), Some("video/mp4"));
    assert_eq!(header_str(&resp, "content-range"), Some("bytes 0-999/1000"));
    assert_eq!(header_str(&resp, "accept-ranges"), Some("bytes 0-999/1000"));
    assert_eq!(header_str(&resp, "x-accel-buffering"), Some("no"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], &content[..]);
}

#[actix_rt::test]
async fn test_open_range_is_capped_at_chunk_volume() {
    let dirs = MediaDirs::new();
    let content = patterned(10_000_000);
    write_file(dirs.public.path(), "movie.mp4", &content);
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/movie.mp4")
        .insert_header(("Range", "bytes=0-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, "content-range"),
        Some("bytes 0-5242879/10000000")
    );

    let body = test::read_body(resp).await;
    assert_eq!(body.len() as u64, TEST_CHUNK_BYTES);
    assert_eq!(&body[..], &content[..TEST_CHUNK_BYTES as usize]);
}

#[actix_rt::test]
async fn test_open_range_near_end_returns_tail() {
    let dirs = MediaDirs::new();
    let content = patterned(100);
    write_file(dirs.public.path(), "short.webm", &content);
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/short.webm")
        .insert_header(("Range", "bytes=50-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&resp, "content-range"), Some("bytes 50-99/100"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], &content[50..]);
}

#[actix_rt::test]
async fn test_closed_range_is_honoured() {
    let dirs = MediaDirs::new();
    let content = patterned(1000);
    write_file(dirs.public.path(), "clip.mp4", &content);
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/clip.mp4")
        .insert_header(("Range", "bytes=10-19"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&resp, "content-range"), Some("bytes 10-19/1000"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], &content[10..20]);
}

#[actix_rt::test]
async fn test_repeated_range_is_identical() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "clip.mp4", &patterned(5000));
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/fileserver/clip.mp4")
            .insert_header(("Range", "bytes=1200-"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            header_str(&resp, "content-range"),
            Some("bytes 1200-4999/5000")
        );
        bodies.push(test::read_body(resp).await);
    }

    assert_eq!(bodies[0], bodies[1]);
}

#[actix_rt::test]
async fn test_malformed_range_starts_at_zero() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "clip.mp4", &patterned(64));
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    for range in ["bytes=-10", "pages=1-2", "bytes=abc-"] {
        let req = test::TestRequest::get()
            .uri("/api/fileserver/clip.mp4")
            .insert_header(("Range", range))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT, "{}", range);
        assert_eq!(header_str(&resp, "content-range"), Some("bytes 0-63/64"));
    }
}

#[actix_rt::test]
async fn test_range_past_end_is_not_satisfiable() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "clip.mp4", &patterned(100));
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/clip.mp4")
        .insert_header(("Range", "bytes=100-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&resp, "content-range"), Some("bytes */100"));
}

#[actix_rt::test]
async fn test_empty_video_is_served_whole() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "empty.mp4", b"");
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/empty.mp4")
        .insert_header(("Range", "bytes=0-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("content-range").is_none());
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}
