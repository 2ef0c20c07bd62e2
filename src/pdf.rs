// ABOUTME: PDF generation module for the pitch-deck application
// ABOUTME: Assembles captured slide images into one page-per-slide PDF document

use crate::config::Viewport;
use crate::errors::{DeckError, Result};
use crate::export::CaptureRecord;
use crate::utils;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Title written into the document information dictionary
pub const DOCUMENT_TITLE: &str = "Pitch Deck";

/// Build the PDF at `output` with one page per record, in ascending slide order.
///
/// Every page is exactly `viewport.width` x `viewport.height` points and the
/// image is stretched over the whole page with no margins. Records whose image
/// cannot be read or decoded are skipped. Returns the number of pages written.
pub fn assemble_pdf(records: &[CaptureRecord], viewport: &Viewport, output: &Path) -> Result<usize> {
    info!("Creating PDF from {} captured slides", records.len());

    let mut ordered: Vec<&CaptureRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.slide_index);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(ordered.len());

    for record in ordered {
        info!("Adding slide {} to PDF", record.ordinal());

        match add_page(&mut doc, pages_id, record, viewport) {
            Ok(page_id) => kids.push(page_id.into()),
            Err(e) => {
                warn!("Failed to add slide {} to PDF: {}", record.ordinal(), e);
            }
        }
    }

    if kids.is_empty() {
        return Err(DeckError::PdfError(
            "None of the captured slides could be embedded".to_string(),
        ));
    }

    let page_count = kids.len();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(DOCUMENT_TITLE),
        "Producer" => Object::string_literal("pitch-deck"),
        "CreationDate" => Object::string_literal(
            chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
        ),
    });
    doc.trailer.set("Info", info_id);

    utils::ensure_parent_directory_exists(output)?;

    doc.compress();
    doc.save(output)?;

    info!("PDF created at {:?} with {} pages", output, page_count);
    Ok(page_count)
}

/// Embed one capture as a full-page image and return the page object id
fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    record: &CaptureRecord,
    viewport: &Viewport,
) -> Result<ObjectId> {
    let image = image::open(&record.image_path)?.to_rgb8();
    let (pixel_width, pixel_height) = image.dimensions();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(pixel_width),
            "Height" => i64::from(pixel_height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.into_raw(),
    ));

    let width = i64::from(viewport.width);
    let height = i64::from(viewport.height);
    let name = format!("Slide{:02}", record.ordinal());

    // Scale the unit image square up to the full page
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                name.as_str() => image_id,
            },
        },
    });

    Ok(page_id)
}

/// Find capture images that match a pattern in a directory, sorted by name
pub fn find_capture_images(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob_pattern = format!("{}/{}", dir.to_string_lossy(), pattern);
    let mut paths = Vec::new();

    for entry in (glob::glob(&glob_pattern)
        .map_err(|e| DeckError::PdfError(format!("Invalid glob pattern: {}", e)))?)
    .flatten()
    {
        paths.push(entry);
    }

    paths.sort();

    if paths.is_empty() {
        return Err(DeckError::NoImagesFoundError(glob_pattern));
    }

    Ok(paths)
}

/// Re-assemble a PDF from screenshots kept by an earlier export run
pub fn assemble_directory(
    dir: &Path,
    pattern: &str,
    output: &Path,
    viewport: &Viewport,
) -> Result<usize> {
    info!("Assembling PDF from images in {:?}", dir);

    if !dir.is_dir() {
        return Err(DeckError::PathNotFoundError(dir.to_path_buf()));
    }

    let records: Vec<CaptureRecord> = find_capture_images(dir, pattern)?
        .into_iter()
        .enumerate()
        .map(|(slide_index, image_path)| CaptureRecord {
            slide_index,
            image_path,
        })
        .collect();

    assemble_pdf(&records, viewport, output)
}
