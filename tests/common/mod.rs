#![allow(dead_code)]

use pitch_deck::capture::check_shown_slide;
use pitch_deck::{CaptureSurface, Deck, DeckError, ExportConfig, Viewport};
use std::io::Cursor;
use std::net::TcpListener;
use std::path::Path;

/// A port nothing is listening on
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe socket");
    listener.local_addr().expect("No local address").port()
}

pub fn test_deck(count: usize) -> Deck {
    let slides = (0..count)
        .map(|i| (format!("Slide {}", i + 1), format!("<h1>Slide {}</h1>", i + 1)))
        .collect();
    Deck::new("Test Deck", slides).expect("Failed to build deck")
}

pub fn small_viewport() -> Viewport {
    Viewport {
        width: 64,
        height: 36,
        scale: 1.0,
    }
}

pub fn export_config(base_url: &str, dir: &Path, slide_count: Option<usize>) -> ExportConfig {
    ExportConfig {
        base_url: base_url.to_string(),
        output_dir: dir.join("screenshots"),
        pdf_output: dir.join("out").join("deck.pdf"),
        viewport: small_viewport(),
        slide_count,
        delay_ms: 0,
        transition_delay_ms: 0,
        timeout_ms: 5000,
        ..ExportConfig::default()
    }
}

/// In-memory capture surface producing one solid-colour PNG per slide
pub struct FakeSurface {
    viewport: Viewport,
    shown: Option<usize>,
    fail_on: Vec<usize>,
    lag_on: Vec<usize>,
}

impl FakeSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            shown: None,
            fail_on: Vec::new(),
            lag_on: Vec::new(),
        }
    }

    /// Requests for these indexes come to rest one slide short
    pub fn lagging_on(viewport: Viewport, lag_on: &[usize]) -> Self {
        Self {
            lag_on: lag_on.to_vec(),
            ..Self::new(viewport)
        }
    }

    pub fn failing_on(viewport: Viewport, fail_on: &[usize]) -> Self {
        Self {
            fail_on: fail_on.to_vec(),
            ..Self::new(viewport)
        }
    }
}

impl CaptureSurface for FakeSurface {
    fn show_slide(&mut self, index: usize) -> pitch_deck::Result<()> {
        let landed = if self.lag_on.contains(&index) {
            index.saturating_sub(1)
        } else {
            index
        };
        self.shown = Some(landed);
        check_shown_slide(index, Some(&landed.to_string()))
    }

    fn capture(&mut self) -> pitch_deck::Result<Vec<u8>> {
        let index = self
            .shown
            .ok_or_else(|| DeckError::ScreenshotError("no slide shown".to_string()))?;
        if self.fail_on.contains(&index) {
            return Err(DeckError::ScreenshotError(format!(
                "simulated failure on slide {}",
                index + 1
            )));
        }

        let width = (f64::from(self.viewport.width) * self.viewport.scale) as u32;
        let height = (f64::from(self.viewport.height) * self.viewport.scale) as u32;
        let shade = (index * 20 % 256) as u8;
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, 64, 255 - shade]));

        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .map_err(|e| DeckError::ScreenshotError(e.to_string()))?;
        Ok(bytes.into_inner())
    }
}

/// (XObject name, MediaBox) for every page of the PDF, in page order
pub fn pdf_pages(path: &Path) -> Vec<(String, Vec<i64>)> {
    let doc = lopdf::Document::load(path).expect("Failed to load PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).expect("Page is not a dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(|o| o.as_array())
                .expect("Page has no MediaBox")
                .iter()
                .map(|o| o.as_i64().expect("MediaBox entry is not an integer"))
                .collect();
            let xobjects = page
                .get(b"Resources")
                .and_then(|o| o.as_dict())
                .and_then(|resources| resources.get(b"XObject"))
                .and_then(|o| o.as_dict())
                .expect("Page has no XObject resources");
            let name = xobjects
                .iter()
                .next()
                .map(|(key, _)| String::from_utf8_lossy(key).to_string())
                .expect("Page has no image");
            (name, media_box)
        })
        .collect()
}

pub fn count_files_with_pattern(dir: &Path, pattern: &str) -> usize {
    let glob_pattern = format!("{}/{}", dir.to_string_lossy(), pattern);
    glob::glob(&glob_pattern)
        .expect("Failed to read glob pattern")
        .filter_map(Result::ok)
        .count()
}
