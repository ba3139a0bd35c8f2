// End-to-end dataset generation against a mock search API and image host

use super::mock_server::{search_body, MockResponse, MockServer, RecordedRequest};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use watermark_dataset::dataset::{self, OutputLayout};
use watermark_dataset::watermark::fonts::test_support::install_test_fonts;
use watermark_dataset::watermark::WatermarkStrategy;
use watermark_dataset::{DatasetConfig, DatasetError};

fn jpeg_photo(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Serves one search page whose entries come from `paths` (relative photo
/// paths, `None` for a photo without a large URL), and a JPEG for every
/// `/photos/ok-*` path. Anything else under `/photos/` is a 404 and
/// `/photos/garbage-*` returns an undecodable body.
fn photo_host(paths: Vec<Option<String>>) -> impl Fn(&RecordedRequest) -> MockResponse {
    let photo = jpeg_photo(640, 480);
    move |request| {
        if request.path == "/v1/search" {
            let origin = request.origin();
            let urls: Vec<Option<String>> = paths
                .iter()
                .map(|p| p.as_ref().map(|p| format!("{}{}", origin, p)))
                .collect();
            MockResponse::json(200, search_body(&urls))
        } else if request.path.starts_with("/photos/ok-") {
            MockResponse::bytes("image/jpeg", photo.clone())
        } else if request.path.starts_with("/photos/garbage-") {
            MockResponse::bytes("image/jpeg", b"not a jpeg".to_vec())
        } else {
            MockResponse::not_found()
        }
    }
}

fn config(server: &MockServer, root: &Path) -> DatasetConfig {
    let mut config = DatasetConfig::new("test-api-key");
    config.api_base_url = format!("{}/v1", server.url());
    config.output_dir = root.join("dataset");
    config.fonts_dir = root.join("fonts");
    config.seed = Some(2024);
    config
}

fn assert_canonical_jpeg(path: &Path) {
    let img = image::open(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    assert_eq!((img.width(), img.height()), (448, 448), "{}", path.display());
}

#[tokio::test]
async fn test_ten_photos_single_strategy_produce_ten_pairs() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let paths = (0..10).map(|i| Some(format!("/photos/ok-{}.jpeg", i))).collect();
    let server = MockServer::start(photo_host(paths)).await;

    let mut config = config(&server, temp_dir.path());
    config.strategy = Some(WatermarkStrategy::Single);
    config.target_count = 10;

    let summary = dataset::generate(&config).await.unwrap();

    assert_eq!(summary.processed, 10);
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.skipped, 0);

    let layout = OutputLayout::new(&config.output_dir);
    for index in 0..10 {
        assert_canonical_jpeg(&layout.unmarked_path(index));
        assert_canonical_jpeg(&layout.watermarked_path(index));
    }
    assert!(!layout.unmarked_path(10).exists());
    assert!(!layout.watermarked_path(10).exists());

    assert_eq!(server.requests_to("/v1/search").len(), 1);
}

#[tokio::test]
async fn test_failed_photos_are_skipped_and_indices_stay_contiguous() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let paths = vec![
        Some("/photos/ok-0.jpeg".to_string()),
        None,
        Some("/photos/missing-2.jpeg".to_string()),
        Some("/photos/ok-3.jpeg".to_string()),
        Some("/photos/garbage-4.jpeg".to_string()),
        Some("/photos/ok-5.jpeg".to_string()),
    ];
    let server = MockServer::start(photo_host(paths)).await;

    let mut config = config(&server, temp_dir.path());
    config.target_count = 3;

    let summary = dataset::generate(&config).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 3);

    let layout = OutputLayout::new(&config.output_dir);
    for index in 0..3 {
        assert_canonical_jpeg(&layout.unmarked_path(index));
        assert_canonical_jpeg(&layout.watermarked_path(index));
    }
    assert!(!layout.unmarked_path(3).exists());
}

#[tokio::test]
async fn test_run_fetches_more_pages_until_target_reached() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let paths = vec![
        Some("/photos/ok-0.jpeg".to_string()),
        Some("/photos/ok-1.jpeg".to_string()),
        Some("/photos/ok-2.jpeg".to_string()),
    ];
    let server = MockServer::start(photo_host(paths)).await;

    let mut config = config(&server, temp_dir.path());
    config.strategy = Some(WatermarkStrategy::Grid);
    config.target_count = 5;

    let summary = dataset::generate(&config).await.unwrap();

    // Whole pages are processed, so two pages of three overshoot to six.
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.processed, 6);
    let layout = OutputLayout::new(&config.output_dir);
    assert_canonical_jpeg(&layout.watermarked_path(5));
}

#[tokio::test]
async fn test_start_index_appends_after_existing_pairs() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let paths = vec![
        Some("/photos/ok-0.jpeg".to_string()),
        Some("/photos/ok-1.jpeg".to_string()),
    ];
    let server = MockServer::start(photo_host(paths)).await;

    let mut config = config(&server, temp_dir.path());
    config.start_index = 40;
    config.target_count = 2;

    dataset::generate(&config).await.unwrap();

    let layout = OutputLayout::new(&config.output_dir);
    assert!(!layout.unmarked_path(0).exists());
    assert_canonical_jpeg(&layout.unmarked_path(40));
    assert_canonical_jpeg(&layout.watermarked_path(41));
}

#[tokio::test]
async fn test_same_seed_produces_identical_dataset() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let paths = vec![
        Some("/photos/ok-0.jpeg".to_string()),
        Some("/photos/ok-1.jpeg".to_string()),
    ];
    let server = MockServer::start(photo_host(paths)).await;

    let mut first = config(&server, temp_dir.path());
    first.target_count = 2;
    first.output_dir = temp_dir.path().join("first");
    let mut second = first.clone();
    second.output_dir = temp_dir.path().join("second");

    dataset::generate(&first).await.unwrap();
    dataset::generate(&second).await.unwrap();

    for index in 0..2 {
        let a = std::fs::read(OutputLayout::new(&first.output_dir).watermarked_path(index)).unwrap();
        let b = std::fs::read(OutputLayout::new(&second.output_dir).watermarked_path(index)).unwrap();
        assert_eq!(a, b, "watermarked image {} differs between runs", index);
    }
}

#[tokio::test]
async fn test_search_api_error_ends_run() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let server = MockServer::start(|_| MockResponse::json(401, r#"{"error":"Unauthorized"}"#)).await;

    let config = config(&server, temp_dir.path());
    let err = dataset::generate(&config).await.unwrap_err();

    assert!(matches!(err, DatasetError::Source(_)));
    assert!(err.to_string().contains("401"));
    // Output directories are created before the first search.
    assert!(OutputLayout::new(&config.output_dir).unmarked_dir().is_dir());
}

#[tokio::test]
async fn test_empty_search_pages_exhaust_source() {
    let temp_dir = TempDir::new().unwrap();
    install_test_fonts(&temp_dir.path().join("fonts")).unwrap();
    let server = MockServer::start(photo_host(Vec::new())).await;

    let config = config(&server, temp_dir.path());
    let err = dataset::generate(&config).await.unwrap_err();

    assert!(matches!(
        err,
        DatasetError::SourceExhausted { empty_pages: 5, .. }
    ));
    assert_eq!(server.requests_to("/v1/search").len(), 5);
}
