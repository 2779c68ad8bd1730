//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary upload directory,
//! default config, and full [`AppContext`]. The [`with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;

use pixelforge::config::Config;
use pixelforge::server::{create_router, AppContext};
use pixelforge::store::ImageStore;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temporary upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    _dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and a temp upload dir.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");

        let store =
            ImageStore::open(&config.storage.upload_dir).expect("failed to open image store");

        let ctx = AppContext {
            store: Arc::new(store),
            config: Arc::new(config),
            metrics: None,
        };

        Self { ctx, _dir: dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Seed the store with a file, bypassing the HTTP layer.
    #[allow(dead_code)]
    pub fn seed(&self, name: &str, bytes: &[u8]) {
        self.ctx.store.put(name, bytes).expect("failed to seed store");
    }
}

/// Encode a solid-color RGB image as PNG bytes.
#[allow(dead_code)]
pub fn png_image(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("failed to encode test image");
    buf.into_inner()
}

/// Build a multipart form with one `images` part per (filename, bytes) pair.
#[allow(dead_code)]
pub fn images_form(files: Vec<(&str, Vec<u8>)>) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for (name, bytes) in files {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());
        form = form.part("images", part);
    }
    form
}
