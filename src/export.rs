// ABOUTME: Export pipeline for the pitch-deck application
// ABOUTME: Captures every slide of a running presentation and assembles them into a PDF

use crate::capture::{self, CaptureSurface, ChromeSurface};
use crate::config::ExportConfig;
use crate::errors::{DeckError, Result};
use crate::pdf;
use crate::utils;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One successfully captured slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub slide_index: usize,
    pub image_path: PathBuf,
}

impl CaptureRecord {
    /// 1-based position of the slide
    pub fn ordinal(&self) -> usize {
        self.slide_index + 1
    }
}

/// Outcome of a pipeline run that produced a document
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub records: Vec<CaptureRecord>,
    /// 1-based ordinals of slides that could not be captured
    pub failed: Vec<usize>,
    pub pages: usize,
    pub pdf_path: PathBuf,
    pub screenshots_kept: bool,
}

/// Sortable capture file name for the slide at `index`, e.g. `slide-01.png`
pub fn capture_file_name(index: usize) -> String {
    format!("slide-{:02}.png", index + 1)
}

/// Export using a headless Chrome capture surface
pub fn export_deck(config: &ExportConfig) -> Result<ExportReport> {
    run_export(config, ChromeSurface::launch)
}

/// Run the whole pipeline: liveness check, capture loop, assembly, cleanup.
///
/// `launch` is only called once the presentation is known to be reachable. The
/// surface it returns is dropped before this function returns, on every path.
/// Only an unreachable presentation, a failed launch or zero captured slides
/// are errors; individual slide failures are logged and skipped.
pub fn run_export<S, F>(config: &ExportConfig, launch: F) -> Result<ExportReport>
where
    S: CaptureSurface,
    F: FnOnce(&ExportConfig) -> Result<S>,
{
    config.validate()?;
    let timeout = Duration::from_millis(config.timeout_ms);

    capture::check_liveness(&config.base_url, timeout)?;

    let slide_count = match config.slide_count {
        Some(count) => count,
        None => capture::discover_slide_count(&config.base_url, timeout)?,
    };

    let (records, failed) = {
        let mut surface = launch(config)?;

        utils::ensure_directory_exists(&config.output_dir)?;
        utils::validate_directory_writable(&config.output_dir)?;

        capture_slides(&mut surface, slide_count, &config.output_dir)
    };

    if records.is_empty() {
        error!("No screenshots were captured");
        return Err(DeckError::NoCapturesError);
    }

    let pages = pdf::assemble_pdf(&records, &config.viewport, &config.pdf_output)?;

    if config.keep_screenshots {
        info!("Keeping screenshots in {:?}", config.output_dir);
    } else {
        cleanup_captures(&records, &config.output_dir);
    }

    info!("PDF generation complete: {:?}", config.pdf_output);

    Ok(ExportReport {
        records,
        failed,
        pages,
        pdf_path: config.pdf_output.clone(),
        screenshots_kept: config.keep_screenshots,
    })
}

/// Capture slides `0..slide_count` one after another into `output_dir`.
///
/// Returns the records of the slides that succeeded and the 1-based ordinals
/// of those that failed.
pub fn capture_slides<S: CaptureSurface>(
    surface: &mut S,
    slide_count: usize,
    output_dir: &Path,
) -> (Vec<CaptureRecord>, Vec<usize>) {
    let start_time = Instant::now();
    let mut records = Vec::with_capacity(slide_count);
    let mut failed = Vec::new();

    for slide_index in 0..slide_count {
        let slide_num = slide_index + 1;
        info!("Capturing slide {}/{}", slide_num, slide_count);

        match capture_slide(surface, slide_index, output_dir) {
            Ok(record) => {
                info!("Slide {} captured: {:?}", slide_num, record.image_path);
                records.push(record);
            }
            Err(e) => {
                // Log the error but continue with other slides
                error!("Error capturing slide {}: {}", slide_num, e);
                failed.push(slide_num);
            }
        }
    }

    info!(
        "Screenshot capture complete. Captured {} of {} slides in {:.2} seconds",
        records.len(),
        slide_count,
        start_time.elapsed().as_secs_f64()
    );

    (records, failed)
}

fn capture_slide<S: CaptureSurface>(
    surface: &mut S,
    slide_index: usize,
    output_dir: &Path,
) -> Result<CaptureRecord> {
    surface.show_slide(slide_index)?;
    let screenshot_data = surface.capture()?;

    let image_path = output_dir.join(capture_file_name(slide_index));
    fs::write(&image_path, &screenshot_data)?;

    Ok(CaptureRecord {
        slide_index,
        image_path,
    })
}

/// Delete captured images, then try to remove the staging directory.
/// Failures are warnings only.
pub fn cleanup_captures(records: &[CaptureRecord], output_dir: &Path) {
    info!("Cleaning up screenshot files");

    for record in records {
        if let Err(e) = fs::remove_file(&record.image_path) {
            warn!("Could not delete {:?}: {}", record.image_path, e);
        }
    }

    match fs::remove_dir(output_dir) {
        Ok(()) => info!("Screenshots directory cleaned up"),
        Err(e) => warn!(
            "Screenshots directory {:?} not empty or could not be removed: {}",
            output_dir, e
        ),
    }
}
