// ABOUTME: Configuration module for the pitch-deck application
// ABOUTME: Provides export settings from defaults, environment variables and CLI overrides

use crate::errors::{DeckError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_OUTPUT_DIR: &str = "./screenshots";
pub const DEFAULT_PDF_OUTPUT: &str = "./pitch-deck.pdf";
pub const DEFAULT_SLIDE_COUNT: usize = 12;

/// Capture resolution. Pages in the PDF are `width` x `height` points; the
/// screenshots themselves are `scale` times larger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            scale: 2.0,
        }
    }
}

/// How the capture surface brings a slide on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// Request `?slide=N` directly
    #[default]
    Direct,
    /// Load the root and press ArrowRight N times
    Keyboard,
}

impl FromStr for NavigationMode {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(NavigationMode::Direct),
            "keyboard" | "keys" => Ok(NavigationMode::Keyboard),
            other => Err(DeckError::ConfigError(format!(
                "Unknown navigation mode: {} (expected direct or keyboard)",
                other
            ))),
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationMode::Direct => write!(f, "direct"),
            NavigationMode::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Settings for one export pipeline run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Root address of the running presentation
    pub base_url: String,
    /// Staging directory for the captured images
    pub output_dir: PathBuf,
    /// Final document path
    pub pdf_output: PathBuf,
    pub viewport: Viewport,
    /// Slides to traverse; `None` asks the presentation server
    pub slide_count: Option<usize>,
    /// Post-transition settle time in ms, used when no settled marker shows up
    pub delay_ms: u64,
    /// Pause between simulated key presses in keyboard mode
    pub transition_delay_ms: u64,
    /// Bound on the liveness check and on waiting for the root container
    pub timeout_ms: u64,
    pub navigation: NavigationMode,
    pub keep_screenshots: bool,
    pub browser_path: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pdf_output: PathBuf::from(DEFAULT_PDF_OUTPUT),
            viewport: Viewport::default(),
            slide_count: Some(DEFAULT_SLIDE_COUNT),
            delay_ms: 2000,
            transition_delay_ms: 500,
            timeout_ms: 10000,
            navigation: NavigationMode::default(),
            keep_screenshots: false,
            browser_path: None,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(DeckError::ConfigError(format!(
                "Viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.viewport.scale.is_nan() || self.viewport.scale <= 0.0 {
            return Err(DeckError::ConfigError(format!(
                "Viewport scale must be positive, got {}",
                self.viewport.scale
            )));
        }
        if self.slide_count == Some(0) {
            return Err(DeckError::ConfigError(
                "Slide count must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            DeckError::ConfigError(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;
        Ok(())
    }
}

/// Values supplied on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub pdf_output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<f64>,
    pub slide_count: Option<usize>,
    /// Ask the presentation server for the slide count instead
    pub discover_slide_count: bool,
    pub delay_ms: Option<u64>,
    pub navigation: Option<NavigationMode>,
    pub keep_screenshots: bool,
}

/// Global configuration for the application
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub export: ExportConfig,
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = ExportConfig::default();

        let export = ExportConfig {
            base_url: env::var("DECK_BASE_URL").unwrap_or(defaults.base_url),
            output_dir: env::var("DECK_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            pdf_output: env::var("DECK_PDF_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.pdf_output),
            viewport: Viewport {
                width: env_parse("DECK_VIEWPORT_WIDTH")?.unwrap_or(defaults.viewport.width),
                height: env_parse("DECK_VIEWPORT_HEIGHT")?.unwrap_or(defaults.viewport.height),
                scale: env_parse("DECK_VIEWPORT_SCALE")?.unwrap_or(defaults.viewport.scale),
            },
            slide_count: match env::var("DECK_SLIDE_COUNT") {
                Ok(raw) if raw.eq_ignore_ascii_case("auto") => None,
                Ok(_) => env_parse("DECK_SLIDE_COUNT")?,
                Err(_) => defaults.slide_count,
            },
            delay_ms: env_parse("DECK_DELAY_MS")?.unwrap_or(defaults.delay_ms),
            transition_delay_ms: env_parse("DECK_TRANSITION_DELAY_MS")?
                .unwrap_or(defaults.transition_delay_ms),
            timeout_ms: env_parse("DECK_TIMEOUT_MS")?.unwrap_or(defaults.timeout_ms),
            navigation: match env::var("DECK_NAVIGATION") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.navigation,
            },
            keep_screenshots: false,
            browser_path: env::var("BROWSER_PATH").ok().filter(|p| !p.is_empty()),
        };

        Ok(Self { export })
    }

    /// Get an export configuration with the command-line overrides applied
    pub fn export_config(&self, overrides: ExportOverrides) -> ExportConfig {
        let base = &self.export;
        ExportConfig {
            base_url: overrides.base_url.unwrap_or_else(|| base.base_url.clone()),
            output_dir: overrides
                .output_dir
                .unwrap_or_else(|| base.output_dir.clone()),
            pdf_output: overrides
                .pdf_output
                .unwrap_or_else(|| base.pdf_output.clone()),
            viewport: Viewport {
                width: overrides.width.unwrap_or(base.viewport.width),
                height: overrides.height.unwrap_or(base.viewport.height),
                scale: overrides.scale.unwrap_or(base.viewport.scale),
            },
            slide_count: if overrides.discover_slide_count {
                None
            } else {
                overrides.slide_count.or(base.slide_count)
            },
            delay_ms: overrides.delay_ms.unwrap_or(base.delay_ms),
            navigation: overrides.navigation.unwrap_or(base.navigation),
            keep_screenshots: overrides.keep_screenshots || base.keep_screenshots,
            ..base.clone()
        }
    }
}

/// Parse an optional environment variable, rejecting malformed values
fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DeckError::ConfigError(format!("Invalid value for {}: {}", name, raw))),
        Err(_) => Ok(None),
    }
}
