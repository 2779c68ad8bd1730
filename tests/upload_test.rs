//! Integration tests for the upload route.

mod common;

use common::{images_form, png_image, TestHarness};

#[tokio::test]
async fn upload_stores_files_and_reports_time() {
    let (_h, addr) = TestHarness::with_server().await;

    let form = images_form(vec![
        ("red.png", png_image(4, 4, [255, 0, 0])),
        ("blue.png", png_image(2, 2, [0, 0, 255])),
    ]);
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Upload successful");
    assert!(body["time_elapsed"].as_f64().unwrap() >= 0.0);

    let red = reqwest::get(format!("http://{addr}/image/red.png"))
        .await
        .unwrap();
    assert_eq!(red.status(), 200);
    let blue = reqwest::get(format!("http://{addr}/image/blue.png"))
        .await
        .unwrap();
    assert_eq!(blue.status(), 200);
}

#[tokio::test]
async fn upload_without_images_field_is_400() {
    let (_h, addr) = TestHarness::with_server().await;

    let form = reqwest::multipart::Form::new().text("comment", "no files here");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["error"], "Validation error: No images part in request");
}

#[tokio::test]
async fn upload_skips_entries_without_filename() {
    let (h, addr) = TestHarness::with_server().await;

    let form = images_form(vec![
        ("kept.png", png_image(2, 2, [1, 2, 3])),
        ("", png_image(2, 2, [4, 5, 6])),
    ]);
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let stored = h.ctx.store.list().unwrap();
    assert_eq!(stored, vec!["kept.png".to_string()]);
}

#[tokio::test]
async fn upload_overwrites_existing_file() {
    let (_h, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let first = png_image(2, 2, [10, 10, 10]);
    let second = png_image(2, 2, [200, 200, 200]);

    for bytes in [&first, &second] {
        let form = images_form(vec![("same.png", bytes.clone())]);
        let resp = client
            .post(format!("http://{addr}/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let body = reqwest::get(format!("http://{addr}/image/same.png"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&body[..], &second[..]);
}

#[tokio::test]
async fn upload_rejects_path_traversal() {
    let (h, addr) = TestHarness::with_server().await;

    let form = images_form(vec![("../escape.png", png_image(2, 2, [0, 0, 0]))]);
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "validation_error");
    assert!(h.ctx.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn upload_with_only_empty_filenames_stores_nothing() {
    let (h, addr) = TestHarness::with_server().await;

    let form = images_form(vec![("", png_image(2, 2, [9, 9, 9]))]);
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(h.ctx.store.list().unwrap().is_empty());
}
