// ABOUTME: Library module for the pitch-deck program.
// ABOUTME: Contains the slide navigation controller, the presentation server and the PDF export pipeline.

// Reexport modules
pub mod capture;
pub mod config;
pub mod deck;
pub mod errors;
pub mod export;
pub mod html;
pub mod navigation;
pub mod pdf;
pub mod server;
pub mod utils;

// Reexport common types and functions
pub use capture::{CaptureSurface, ChromeSurface, check_liveness};
pub use config::{Config, ExportConfig, ExportOverrides, NavigationMode, Viewport};
pub use deck::{Deck, Slide};
pub use errors::{DeckError, Result};
pub use export::{CaptureRecord, ExportReport, export_deck, run_export};
pub use navigation::{Controls, Intent, NavigationState, transition};
pub use pdf::{assemble_directory, assemble_pdf};
pub use server::{ServerHandle, serve, spawn};
