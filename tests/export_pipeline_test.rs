mod common;

use common::{
    count_files_with_pattern, export_config, pdf_pages, small_viewport, test_deck, unused_port,
    FakeSurface,
};
use pitch_deck::{run_export, DeckError, ExportConfig};
use std::cell::Cell;
use std::fs;
use tempfile::TempDir;

fn fake_launch(_config: &ExportConfig) -> pitch_deck::Result<FakeSurface> {
    Ok(FakeSurface::new(small_viewport()))
}

fn expected_names(indexes: impl Iterator<Item = usize>) -> Vec<String> {
    indexes.map(|i| format!("Slide{:02}", i + 1)).collect()
}

#[test]
fn test_unreachable_presentation_aborts_before_capturing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = format!("http://127.0.0.1:{}", unused_port());
    let config = export_config(&base_url, temp_dir.path(), Some(12));

    let launched = Cell::new(false);
    let result = run_export(&config, |config| {
        launched.set(true);
        fake_launch(config)
    });

    assert!(
        matches!(result, Err(DeckError::ServerUnreachable { .. })),
        "Expected unreachable error, got {:?}",
        result
    );
    assert!(!launched.get(), "Browser must not be launched");
    assert!(!config.output_dir.exists(), "No screenshots directory expected");
    assert!(!config.pdf_output.exists(), "No PDF expected");
}

#[test]
fn test_full_export_produces_one_page_per_slide() {
    let server = pitch_deck::spawn(test_deck(12), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), Some(12));

    let report = run_export(&config, fake_launch).expect("Export failed");

    assert_eq!(report.records.len(), 12);
    assert!(report.failed.is_empty());
    assert_eq!(report.pages, 12);
    for (i, record) in report.records.iter().enumerate() {
        assert_eq!(record.slide_index, i);
    }

    let pages = pdf_pages(&config.pdf_output);
    assert_eq!(pages.len(), 12);

    let names: Vec<String> = pages.iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(names, expected_names(0..12));

    for (_, media_box) in &pages {
        assert_eq!(media_box, &vec![0, 0, 64, 36]);
    }

    // Default run removes the screenshots and their directory
    assert!(!config.output_dir.exists(), "Screenshots directory should be removed");
}

#[test]
fn test_failed_slide_is_skipped() {
    let server = pitch_deck::spawn(test_deck(12), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), Some(12));

    let report = run_export(&config, |_| {
        Ok(FakeSurface::failing_on(small_viewport(), &[5]))
    })
    .expect("A single failed slide must not fail the export");

    assert_eq!(report.records.len(), 11);
    assert_eq!(report.failed, vec![6]);
    assert_eq!(report.pages, 11);

    let names: Vec<String> = pdf_pages(&config.pdf_output)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, expected_names((0..12).filter(|&i| i != 5)));
}

#[test]
fn test_slide_resting_on_wrong_index_is_not_captured() {
    let server = pitch_deck::spawn(test_deck(12), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = export_config(&server.base_url(), temp_dir.path(), Some(12));
    config.keep_screenshots = true;

    let report = run_export(&config, |_| {
        Ok(FakeSurface::lagging_on(small_viewport(), &[3]))
    })
    .expect("A slide that never showed up must not fail the export");

    assert_eq!(report.failed, vec![4]);
    assert_eq!(report.pages, 11);
    assert!(!config.output_dir.join("slide-04.png").exists());
    assert_eq!(count_files_with_pattern(&config.output_dir, "slide-*.png"), 11);

    let names: Vec<String> = pdf_pages(&config.pdf_output)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, expected_names((0..12).filter(|&i| i != 3)));
}

#[test]
fn test_no_captures_is_fatal() {
    let server = pitch_deck::spawn(test_deck(3), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), Some(3));

    let result = run_export(&config, |_| {
        Ok(FakeSurface::failing_on(small_viewport(), &[0, 1, 2]))
    });

    assert!(matches!(result, Err(DeckError::NoCapturesError)));
    assert!(!config.pdf_output.exists(), "No PDF expected");
}

#[test]
fn test_keep_screenshots_leaves_one_file_per_capture() {
    let server = pitch_deck::spawn(test_deck(12), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = export_config(&server.base_url(), temp_dir.path(), Some(12));
    config.keep_screenshots = true;

    let report = run_export(&config, |_| {
        Ok(FakeSurface::failing_on(small_viewport(), &[3]))
    })
    .expect("Export failed");

    assert!(report.screenshots_kept);
    assert_eq!(count_files_with_pattern(&config.output_dir, "*"), 11);
    assert_eq!(count_files_with_pattern(&config.output_dir, "slide-*.png"), 11);
    assert!(config.output_dir.join("slide-01.png").exists());
    assert!(!config.output_dir.join("slide-04.png").exists());
    assert!(config.output_dir.join("slide-12.png").exists());
}

#[test]
fn test_cleanup_tolerates_foreign_files() {
    let server = pitch_deck::spawn(test_deck(2), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), Some(2));

    fs::create_dir_all(&config.output_dir).expect("Failed to create output dir");
    fs::write(config.output_dir.join("notes.txt"), "keep me").expect("Failed to write file");

    run_export(&config, fake_launch).expect("Export must succeed despite leftover files");

    assert!(config.output_dir.join("notes.txt").exists());
    assert_eq!(count_files_with_pattern(&config.output_dir, "slide-*.png"), 0);
}

#[test]
fn test_slide_count_discovered_from_server() {
    let server = pitch_deck::spawn(test_deck(5), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), None);

    let report = run_export(&config, fake_launch).expect("Export failed");
    let captured: Vec<usize> = report.records.iter().map(|r| r.slide_index).collect();

    assert_eq!(captured, vec![0, 1, 2, 3, 4]);
    assert_eq!(pdf_pages(&config.pdf_output).len(), 5);
}

#[test]
fn test_launch_failure_is_fatal() {
    let server = pitch_deck::spawn(test_deck(2), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = export_config(&server.base_url(), temp_dir.path(), Some(2));

    let result = run_export(&config, |_| -> pitch_deck::Result<FakeSurface> {
        Err(DeckError::BrowserError {
            message: "no browser".to_string(),
            source: None,
        })
    });

    assert!(matches!(result, Err(DeckError::BrowserError { .. })));
    assert!(!config.pdf_output.exists());
}

#[test]
fn test_assemble_kept_screenshots() {
    let server = pitch_deck::spawn(test_deck(4), "127.0.0.1:0").expect("Failed to start server");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = export_config(&server.base_url(), temp_dir.path(), Some(4));
    config.keep_screenshots = true;

    run_export(&config, fake_launch).expect("Export failed");

    let rebuilt = temp_dir.path().join("rebuilt.pdf");
    let pages = pitch_deck::assemble_directory(
        &config.output_dir,
        "slide-*.png",
        &rebuilt,
        &small_viewport(),
    )
    .expect("Assembly failed");

    assert_eq!(pages, 4);
    let names: Vec<String> = pdf_pages(&rebuilt).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, expected_names(0..4));
}

#[test]
fn test_assemble_empty_directory_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = pitch_deck::assemble_directory(
        temp_dir.path(),
        "slide-*.png",
        &temp_dir.path().join("out.pdf"),
        &small_viewport(),
    );
    assert!(matches!(result, Err(DeckError::NoImagesFoundError(_))));
}

#[test]
fn test_unreadable_capture_is_skipped_during_assembly() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let good = temp_dir.path().join("slide-01.png");
    let bad = temp_dir.path().join("slide-02.png");
    image::RgbImage::from_pixel(64, 36, image::Rgb([10, 20, 30]))
        .save(&good)
        .expect("Failed to write image");
    fs::write(&bad, b"not a png").expect("Failed to write file");

    let records = vec![
        pitch_deck::CaptureRecord {
            slide_index: 1,
            image_path: bad,
        },
        pitch_deck::CaptureRecord {
            slide_index: 0,
            image_path: good,
        },
    ];
    let output = temp_dir.path().join("deck.pdf");
    let pages = pitch_deck::assemble_pdf(&records, &small_viewport(), &output)
        .expect("Assembly failed");

    assert_eq!(pages, 1);
    assert_eq!(pdf_pages(&output), vec![("Slide01".to_string(), vec![0, 0, 64, 36])]);
}
