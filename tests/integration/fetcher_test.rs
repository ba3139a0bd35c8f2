// Photo downloads against a mock image host

use super::mock_server::{MockResponse, MockServer};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use watermark_dataset::dataset::ImageFetcher;
use watermark_dataset::FetchError;

fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 60, 30])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn test_fetch_decodes_jpeg() {
    let body = encoded(ImageFormat::Jpeg, 320, 200);
    let server = MockServer::start(move |_| MockResponse::bytes("image/jpeg", body.clone())).await;
    let fetcher = ImageFetcher::new().unwrap();

    let photo = fetcher
        .fetch(&format!("{}/photos/1.jpeg", server.url()))
        .await
        .unwrap();

    assert_eq!((photo.width(), photo.height()), (320, 200));
}

#[tokio::test]
async fn test_fetch_decodes_png_served_without_extension() {
    let body = encoded(ImageFormat::Png, 17, 9);
    let server = MockServer::start(move |_| MockResponse::bytes("image/png", body.clone())).await;
    let fetcher = ImageFetcher::new().unwrap();

    let photo = fetcher
        .fetch(&format!("{}/photos/raw?id=2", server.url()))
        .await
        .unwrap();

    assert_eq!((photo.width(), photo.height()), (17, 9));
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start(|_| MockResponse::not_found()).await;
    let fetcher = ImageFetcher::new().unwrap();

    let err = fetcher
        .fetch(&format!("{}/photos/missing.jpeg", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status(404)));
}

#[tokio::test]
async fn test_fetch_undecodable_body() {
    let server =
        MockServer::start(|_| MockResponse::bytes("image/jpeg", b"<html>nope</html>".to_vec()))
            .await;
    let fetcher = ImageFetcher::new().unwrap();

    let err = fetcher
        .fetch(&format!("{}/photos/broken.jpeg", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_connection_refused_is_http_error() {
    let fetcher = ImageFetcher::with_timeout(Duration::from_secs(2)).unwrap();

    let err = fetcher
        .fetch("http://127.0.0.1:1/photos/1.jpeg")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http(_)));
}
