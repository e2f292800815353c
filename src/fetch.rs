//! Fetch strategies: three interchangeable ways to get an image from a URL
//! onto a row's display surface.
//!
//! Each strategy spawns onto the app's tokio runtime, downloads and decodes
//! off the UI thread, resolves the shared surface, and requests a repaint.
//! Failures never leave the strategy; they resolve the surface to `Failed`
//! and the row draws its fallback visual.

use crate::constants::FETCH_CONCURRENCY;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// What a row's surface currently holds. Written by the fetch task,
/// read by the UI thread every frame.
pub enum SurfaceState {
    Loading,
    Ready(egui::ColorImage),
    Failed,
}

pub type SurfaceHandle = Arc<Mutex<SurfaceState>>;

pub fn new_surface() -> SurfaceHandle {
    Arc::new(Mutex::new(SurfaceState::Loading))
}

/// One fetch issued by the dispatcher: a URL, the surface to resolve, and
/// the logical box the decoded image is sized to.
pub struct FetchRequest {
    pub url: String,
    pub surface: SurfaceHandle,
    pub width: u32,
    pub height: u32,
}

/// Capability interface the dispatcher depends on. The three production
/// implementations differ in client reuse and in the transition the row
/// applies on completion.
pub trait ImageFetchStrategy {
    fn name(&self) -> &'static str;
    fn fetch(&self, request: FetchRequest);
}

/// Strategy A: shared client, bounded concurrency, cross-fade on success.
pub struct CrossfadeStrategy {
    client: reqwest::Client,
    semaphore: Arc<tokio::sync::Semaphore>,
    runtime: tokio::runtime::Handle,
    ctx: egui::Context,
}

impl CrossfadeStrategy {
    pub fn new(runtime: tokio::runtime::Handle, ctx: egui::Context) -> Self {
        Self {
            client: reqwest::Client::new(),
            semaphore: Arc::new(tokio::sync::Semaphore::new(FETCH_CONCURRENCY)),
            runtime,
            ctx,
        }
    }
}

impl ImageFetchStrategy for CrossfadeStrategy {
    fn name(&self) -> &'static str {
        "crossfade"
    }

    fn fetch(&self, request: FetchRequest) {
        let client = self.client.clone();
        let semaphore = self.semaphore.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let _permit = semaphore.acquire().await.ok();
            let image =
                fetch_and_decode(&client, &request.url, request.width, request.height).await;
            resolve(&request.surface, image, &request.url, "crossfade");
            ctx.request_repaint();
        });
    }
}

/// Strategy B: one-shot request, manual fade-in on success.
pub struct FadeInStrategy {
    runtime: tokio::runtime::Handle,
    ctx: egui::Context,
}

impl FadeInStrategy {
    pub fn new(runtime: tokio::runtime::Handle, ctx: egui::Context) -> Self {
        Self { runtime, ctx }
    }
}

impl ImageFetchStrategy for FadeInStrategy {
    fn name(&self) -> &'static str {
        "fade-in"
    }

    fn fetch(&self, request: FetchRequest) {
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let image = async {
                let response = reqwest::get(&request.url).await.ok()?;
                if !response.status().is_success() {
                    return None;
                }
                let bytes = response.bytes().await.ok()?;
                decode_to_fit(&bytes, request.width, request.height)
            }
            .await;
            resolve(&request.surface, image, &request.url, "fade-in");
            ctx.request_repaint();
        });
    }
}

/// Strategy C (default): builds a fresh client per request, no transition,
/// solid error fill on failure.
pub struct DirectStrategy {
    runtime: tokio::runtime::Handle,
    ctx: egui::Context,
}

impl DirectStrategy {
    pub fn new(runtime: tokio::runtime::Handle, ctx: egui::Context) -> Self {
        Self { runtime, ctx }
    }
}

impl ImageFetchStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn fetch(&self, request: FetchRequest) {
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            // One client per request, like the queue-per-call pattern this
            // strategy demonstrates.
            let client = reqwest::Client::new();
            let image =
                fetch_and_decode(&client, &request.url, request.width, request.height).await;
            resolve(&request.surface, image, &request.url, "direct");
            ctx.request_repaint();
        });
    }
}

async fn fetch_and_decode(
    client: &reqwest::Client,
    url: &str,
    width: u32,
    height: u32,
) -> Option<egui::ColorImage> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let bytes = response.bytes().await.ok()?;
    decode_to_fit(&bytes, width, height)
}

/// Decode raw bytes and size them to fill the target box (center-crop).
fn decode_to_fit(bytes: &[u8], width: u32, height: u32) -> Option<egui::ColorImage> {
    let img = image::load_from_memory(bytes).ok()?;
    let img = img.resize_to_fill(width, height, image::imageops::FilterType::Triangle);
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        &rgba.into_raw(),
    ))
}

fn resolve(
    surface: &SurfaceHandle,
    image: Option<egui::ColorImage>,
    url: &str,
    strategy: &'static str,
) {
    let mut state = surface.lock().unwrap();
    *state = match image {
        Some(img) => SurfaceState::Ready(img),
        None => {
            warn!(url, strategy, "image fetch failed");
            SurfaceState::Failed
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decode_sizes_to_target_box() {
        let bytes = png_bytes(600, 300);
        let img = decode_to_fit(&bytes, 300, 150).unwrap();
        assert_eq!(img.size, [300, 150]);
    }

    #[test]
    fn decode_fills_box_from_mismatched_aspect() {
        let bytes = png_bytes(400, 400);
        let img = decode_to_fit(&bytes, 300, 150).unwrap();
        assert_eq!(img.size, [300, 150]);
    }

    #[test]
    fn garbage_bytes_decode_to_none() {
        assert!(decode_to_fit(b"not an image", 300, 150).is_none());
    }

    #[test]
    fn resolve_marks_failure_without_panicking() {
        let surface = new_surface();
        resolve(&surface, None, "http://example/broken", "direct");
        assert!(matches!(*surface.lock().unwrap(), SurfaceState::Failed));
    }
}
