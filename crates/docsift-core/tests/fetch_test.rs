//! Integration tests for remote fetching and scratch files.

use docsift_core::{ErrorCode, ErrorKind, HttpFetcher};

#[tokio::test]
async fn test_fetch_bytes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/img/photo.png")
        .with_status(200)
        .with_body(vec![1u8, 2, 3, 4, 5])
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new(), dir.path());
    let body = fetcher
        .fetch_bytes(&format!("{}/img/photo.png", server.url()))
        .await
        .unwrap();
    assert_eq!(body, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_download_writes_named_scratch_file_and_cleans_up() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/docs/notes.txt")
        .with_status(200)
        .with_body("hello scratch")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new(), dir.path());
    let url = format!("{}/docs/notes.txt", server.url());

    let scratch = fetcher.download(&url, "txt").await.unwrap();
    let path = scratch.path().to_path_buf();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(HttpFetcher::scratch_name(&url, "txt").as_str())
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello scratch");
    assert_eq!(scratch.size().unwrap(), 13);

    drop(scratch);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_download_bad_status_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/missing.pdf")
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new(), dir.path());
    let err = fetcher
        .download(&format!("{}/missing.pdf", server.url()), "pdf")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.code(), ErrorCode::NetBadStatus);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
