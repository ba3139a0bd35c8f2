// Photo search client against a mock search API

use super::mock_server::{search_body, MockResponse, MockServer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use watermark_dataset::source::{PexelsClient, PhotoSource, Query, SourceError};

fn client(server: &MockServer) -> PexelsClient {
    PexelsClient::new(
        format!("{}/v1", server.url()),
        "test-api-key",
        StdRng::seed_from_u64(7),
    )
    .unwrap()
}

fn photo_urls(n: usize) -> Vec<Option<String>> {
    (0..n)
        .map(|i| Some(format!("https://images.example/photos/{}.jpeg", i)))
        .collect()
}

#[tokio::test]
async fn test_search_404_error_contains_status() {
    let server = MockServer::start(|_| MockResponse::not_found()).await;
    let mut client = client(&server);

    let err = client.next_page().await.unwrap_err();

    assert!(matches!(err, SourceError::Api { status: 404, .. }));
    assert!(err.to_string().contains("404"), "got: {}", err);
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn test_search_sends_key_and_query_parameters() {
    let server = MockServer::start(|_| MockResponse::json(200, search_body(&photo_urls(3)))).await;
    let mut client = client(&server);

    let urls = client.search(Query::People).await.unwrap();
    assert_eq!(urls.len(), 3);

    let requests = server.requests_to("/v1/search");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.header("authorization"), Some("test-api-key"));
    assert_eq!(request.query_param("query"), Some("people"));
    assert_eq!(request.query_param("per_page"), Some("10"));
    assert_eq!(request.query_param("size"), Some("small"));
    assert_eq!(request.query_param("page"), Some("1"));
}

#[tokio::test]
async fn test_page_counter_is_tracked_per_query() {
    let server = MockServer::start(|_| MockResponse::json(200, search_body(&photo_urls(2)))).await;
    let mut client = client(&server);

    client.search(Query::People).await.unwrap();
    client.search(Query::People).await.unwrap();
    client.search(Query::Nature).await.unwrap();
    client.search(Query::People).await.unwrap();

    let pages: Vec<(String, String)> = server
        .requests_to("/v1/search")
        .iter()
        .map(|r| {
            (
                r.query_param("query").unwrap().to_string(),
                r.query_param("page").unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(
        pages,
        vec![
            ("people".to_string(), "1".to_string()),
            ("people".to_string(), "2".to_string()),
            ("nature".to_string(), "1".to_string()),
            ("people".to_string(), "3".to_string()),
        ]
    );
    assert_eq!(client.page(Query::People), 4);
    assert_eq!(client.page(Query::Nature), 2);
}

#[tokio::test]
async fn test_failed_search_does_not_advance_page() {
    let server = MockServer::start(|_| MockResponse::json(500, "upstream exploded")).await;
    let mut client = client(&server);

    let err = client.search(Query::Nature).await.unwrap_err();

    assert!(matches!(err, SourceError::Api { status: 500, .. }));
    assert_eq!(client.page(Query::Nature), 1);
}

#[tokio::test]
async fn test_next_page_advances_one_query_per_call() {
    let server = MockServer::start(|_| MockResponse::json(200, search_body(&photo_urls(1)))).await;
    let mut client = client(&server);

    for _ in 0..6 {
        client.next_page().await.unwrap();
    }

    let advanced = (client.page(Query::People) - 1) + (client.page(Query::Nature) - 1);
    assert_eq!(advanced, 6);
    assert_eq!(server.requests_to("/v1/search").len(), 6);
}

#[tokio::test]
async fn test_missing_large_url_becomes_placeholder() {
    let urls = vec![
        Some("https://images.example/a.jpeg".to_string()),
        None,
        Some("https://images.example/c.jpeg".to_string()),
    ];
    let body = search_body(&urls);
    let server = MockServer::start(move |_| MockResponse::json(200, body.clone())).await;
    let mut client = client(&server);

    let page = client.next_page().await.unwrap();

    assert_eq!(page, urls);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start(|_| MockResponse::json(200, "{\"photos\": [")).await;
    let mut client = client(&server);

    let err = client.next_page().await.unwrap_err();
    assert!(matches!(err, SourceError::Parse(_)));
}
