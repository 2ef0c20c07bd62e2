// ABOUTME: Browser capture module for the pitch-deck application
// ABOUTME: Drives a headless browser to show one slide at a time and screenshot the viewport

use crate::config::{ExportConfig, NavigationMode, Viewport};
use crate::errors::{DeckError, Result};
use crate::html::{settled_selector, slide_selector, ROOT_SELECTOR};
use crate::server::API_VERSION;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How long the page may take to report the requested slide once it settled
const SLIDE_CONFIRM_TIMEOUT: Duration = Duration::from_millis(1000);

/// Something that can put a slide on screen and photograph it.
///
/// The export pipeline only talks to this trait, so it can run against a real
/// browser or against an in-memory stand-in.
pub trait CaptureSurface {
    /// Bring slide `index` on screen and wait until it has settled
    fn show_slide(&mut self, index: usize) -> Result<()>;

    /// Capture the visible viewport as PNG bytes
    fn capture(&mut self) -> Result<Vec<u8>>;
}

/// A headless Chrome instance with a single tab.
///
/// The browser process lives exactly as long as this value.
pub struct ChromeSurface {
    // Declared before the browser so the tab is released first
    tab: Arc<Tab>,
    _browser: Browser,
    base_url: Url,
    viewport: Viewport,
    navigation: NavigationMode,
    delay: Duration,
    transition_delay: Duration,
    timeout: Duration,
}

impl ChromeSurface {
    /// Launch a headless browser sized to the configured viewport
    pub fn launch(config: &ExportConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DeckError::ConfigError(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;

        // Configure browser launch options
        let mut launch_options_builder = LaunchOptionsBuilder::default();
        launch_options_builder.window_size(Some((config.viewport.width, config.viewport.height)));
        launch_options_builder.headless(true);
        launch_options_builder.sandbox(false);

        if let Some(browser_path) = &config.browser_path {
            launch_options_builder.path(Some(browser_path.into()));
        }

        let launch_options = launch_options_builder
            .build()
            .map_err(|e| DeckError::BrowserError {
                message: format!("Failed to build browser options: {:?}", e),
                source: None,
            })?;

        info!("Launching headless browser");
        let browser = Browser::new(launch_options)
            .map_err(|e| DeckError::browser("Failed to launch browser", e))?;

        let tab = browser
            .new_tab()
            .map_err(|e| DeckError::browser("Failed to create new tab", e))?;

        Ok(Self {
            tab,
            _browser: browser,
            base_url,
            viewport: config.viewport,
            navigation: config.navigation,
            delay: Duration::from_millis(config.delay_ms),
            transition_delay: Duration::from_millis(config.transition_delay_ms),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    fn load(&self, url: &str) -> Result<()> {
        debug!("Loading {}", url);
        self.tab
            .navigate_to(url)
            .map_err(|e| DeckError::browser(format!("Failed to navigate to {}", url), e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| DeckError::browser("Navigation failed", e))?;
        self.tab
            .wait_for_element_with_custom_timeout(ROOT_SELECTOR, self.timeout)
            .map_err(|e| DeckError::TimeoutError(format!("root container {}: {}", ROOT_SELECTOR, e)))?;
        Ok(())
    }

    /// Wait for the completion marker of slide `index`, at most `limit`.
    /// Returns false when the marker never showed up and the full limit elapsed.
    fn wait_settled(&self, index: usize, limit: Duration) -> bool {
        self.tab
            .wait_for_element_with_custom_timeout(&settled_selector(index), limit)
            .is_ok()
    }

    /// Fail unless the root container reports slide `index`
    fn confirm_slide(&self, index: usize) -> Result<()> {
        if self
            .tab
            .wait_for_element_with_custom_timeout(&slide_selector(index), SLIDE_CONFIRM_TIMEOUT)
            .is_ok()
        {
            return Ok(());
        }

        let shown = self
            .tab
            .find_element(ROOT_SELECTOR)
            .ok()
            .and_then(|root| root.get_attribute_value("data-slide").ok().flatten());
        check_shown_slide(index, shown.as_deref())
    }
}

impl CaptureSurface for ChromeSurface {
    fn show_slide(&mut self, index: usize) -> Result<()> {
        match self.navigation {
            NavigationMode::Direct => {
                self.load(&slide_url(&self.base_url, index))?;
            }
            NavigationMode::Keyboard => {
                self.load(self.base_url.as_str())?;
                for step in 1..=index {
                    self.tab
                        .press_key("ArrowRight")
                        .map_err(|e| DeckError::browser("Failed to press ArrowRight", e))?;
                    if !self.wait_settled(step, self.transition_delay) {
                        debug!("No settled marker after key press {}", step);
                    }
                }
            }
        }

        if !self.wait_settled(index, self.delay) {
            warn!(
                "Slide {} did not report a finished animation, continued after {} ms",
                index + 1,
                self.delay.as_millis()
            );
        }
        self.confirm_slide(index)
    }

    fn capture(&mut self) -> Result<Vec<u8>> {
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: f64::from(self.viewport.width),
            height: f64::from(self.viewport.height),
            scale: self.viewport.scale,
        };

        self.tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(|e| DeckError::ScreenshotError(e.to_string()))
    }
}

impl Drop for ChromeSurface {
    fn drop(&mut self) {
        info!("Closing headless browser");
    }
}

/// Check the `data-slide` value a page reports against the slide requested.
///
/// A page resting on another slide must not be captured under this index.
pub fn check_shown_slide(expected: usize, shown: Option<&str>) -> Result<()> {
    match shown {
        Some(raw) if raw.parse::<usize>().ok() == Some(expected) => Ok(()),
        Some(raw) => Err(DeckError::TimeoutError(format!(
            "slide {} to show, the page is on slide index {}",
            expected + 1,
            raw
        ))),
        None => Err(DeckError::TimeoutError(format!(
            "slide {} to show, the page reports no slide",
            expected + 1
        ))),
    }
}

/// Address that mounts the presentation directly at slide `index`
pub fn slide_url(base_url: &Url, index: usize) -> String {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair("slide", &index.to_string());
    url.to_string()
}

/// Fail unless the presentation root answers within `timeout`
pub fn check_liveness(base_url: &str, timeout: Duration) -> Result<()> {
    info!("Checking if the presentation is running at {}", base_url);

    let unreachable = |reason: String| DeckError::ServerUnreachable {
        url: base_url.to_string(),
        reason,
    };

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DeckError::FetchError)?;

    let response = client
        .get(base_url)
        .send()
        .map_err(|e| unreachable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(unreachable(format!("HTTP {}", response.status())));
    }

    info!("Presentation is running");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DeckSummary {
    count: usize,
}

/// Ask the presentation server how many slides it serves
pub fn discover_slide_count(base_url: &str, timeout: Duration) -> Result<usize> {
    let endpoint = Url::parse(base_url)
        .and_then(|url| url.join(&format!("/api/v{}/deck", API_VERSION)))
        .map_err(|e| DeckError::ConfigError(format!("Invalid base URL {}: {}", base_url, e)))?;

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DeckError::FetchError)?;

    let body = client
        .get(endpoint.as_str())
        .send()?
        .error_for_status()?
        .text()?;
    let summary: DeckSummary = serde_json::from_str(&body)?;

    if summary.count == 0 {
        return Err(DeckError::InvalidDeck(
            "Presentation server reports an empty deck".to_string(),
        ));
    }

    info!("Presentation serves {} slides", summary.count);
    Ok(summary.count)
}
