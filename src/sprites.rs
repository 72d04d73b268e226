//! In-memory sprite thumbnails keyed by image URL.
//!
//! Downloads run on background tasks and only ever write into the cache, so
//! the render loop never waits on the network and the search state is never
//! touched from here.

use image::imageops::FilterType;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const THUMB_W: u32 = 48;
const THUMB_H: u32 = 48;

/// One terminal cell colour; `None` for transparent pixels.
pub type Cell = Option<(u8, u8, u8)>;

/// Compact RGBA thumbnail stored in the cache.
pub struct SpriteThumb {
    pub w: u32,
    pub h: u32,
    /// RGBA pixels in row-major order (len = w*h*4)
    pub pixels: Vec<u8>,
}

impl SpriteThumb {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let small = image::imageops::resize(&img.to_rgba8(), THUMB_W, THUMB_H, FilterType::Lanczos3);
        Ok(Self {
            w: THUMB_W,
            h: THUMB_H,
            pixels: small.into_raw(),
        })
    }

    /// Pixel rows sized `w` x `h`, resized in memory if needed.
    pub fn rows(&self, w: u32, h: u32) -> Vec<Vec<Cell>> {
        let buf = match image::RgbaImage::from_raw(self.w, self.h, self.pixels.clone()) {
            Some(buf) => buf,
            None => return Vec::new(),
        };
        let resized = if self.w == w && self.h == h {
            buf
        } else {
            image::imageops::resize(&buf, w.max(1), h.max(1), FilterType::Lanczos3)
        };
        let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(resized.height() as usize);
        for y in 0..resized.height() {
            let mut row = Vec::with_capacity(resized.width() as usize);
            for x in 0..resized.width() {
                let p = resized.get_pixel(x, y);
                row.push(if p[3] < 128 { None } else { Some((p[0], p[1], p[2])) });
            }
            rows.push(row);
        }
        rows
    }
}

enum Slot {
    Pending,
    Ready(SpriteThumb),
    Missing,
}

#[derive(Clone)]
pub struct SpriteCache {
    http: reqwest::Client,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl SpriteCache {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start downloading `url` unless it is already cached or in flight.
    /// A URL whose last download failed is tried again.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request(&self, url: &str) {
        {
            let mut slots = self.lock();
            if matches!(slots.get(url), Some(Slot::Pending | Slot::Ready(_))) {
                return;
            }
            slots.insert(url.to_string(), Slot::Pending);
        }

        let http = self.http.clone();
        let slots = Arc::clone(&self.slots);
        let url = url.to_string();
        tokio::spawn(async move {
            let slot = match download(&http, &url).await {
                Ok(thumb) => Slot::Ready(thumb),
                Err(e) => {
                    tracing::debug!(%url, error = %e, "sprite unavailable");
                    Slot::Missing
                }
            };
            // Dropped by `retain` while in flight: leave it out.
            let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(current) = slots.get_mut(&url) {
                *current = slot;
            }
        });
    }

    /// Forget every URL not in `urls`.
    pub fn retain(&self, urls: &[String]) {
        self.lock().retain(|url, _| urls.contains(url));
    }

    pub fn insert(&self, url: &str, thumb: SpriteThumb) {
        self.lock().insert(url.to_string(), Slot::Ready(thumb));
    }

    pub fn is_pending(&self, url: &str) -> bool {
        matches!(self.lock().get(url), Some(Slot::Pending))
    }

    pub fn pixels(&self, url: &str, w: u32, h: u32) -> Option<Vec<Vec<Cell>>> {
        match self.lock().get(url) {
            Some(Slot::Ready(thumb)) => Some(thumb.rows(w, h)),
            _ => None,
        }
    }
}

async fn download(
    http: &reqwest::Client,
    url: &str,
) -> Result<SpriteThumb, Box<dyn std::error::Error + Send + Sync>> {
    let bytes = http.get(url).send().await?.error_for_status()?.bytes().await?;
    Ok(SpriteThumb::from_bytes(&bytes)?)
}
