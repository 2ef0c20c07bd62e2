// ABOUTME: HTML rendering module for the pitch-deck application
// ABOUTME: Renders one slide page with navigation controls and the keyboard listener

use crate::deck::Deck;
use crate::navigation::{Intent, NavigationState, NAVIGATION_KEYS};

/// Selector of the root container every rendered page carries
pub const ROOT_SELECTOR: &str = "#deck";

/// Selector matching the root container while it shows slide `index`
pub fn slide_selector(index: usize) -> String {
    format!("{}[data-slide=\"{}\"]", ROOT_SELECTOR, index)
}

/// Selector matching the root container once slide `index` finished animating
pub fn settled_selector(index: usize) -> String {
    format!("{}[data-settled=\"true\"]", slide_selector(index))
}

const STYLE: &str = r#"
* { box-sizing: border-box; }
html, body { margin: 0; height: 100%; }
body {
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  background: linear-gradient(135deg, #0021a5 0%, #4a5fbf 50%, #fa4616 100%);
  color: #fff;
  overflow: hidden;
}
.h-screen { height: 100vh; display: flex; flex-direction: column; }
header { padding: 24px; display: flex; justify-content: space-between; align-items: center; }
header h1 { margin: 0; font-size: 24px; }
.progress { opacity: 0.8; }
.stage { flex: 1; min-height: 0; padding: 0 24px 24px; }
.slide {
  height: 100%;
  background: rgba(255, 255, 255, 0.95);
  color: #111;
  border-radius: 16px;
  padding: 48px;
  overflow: hidden;
  animation: slide-in 0.3s ease-in-out both;
}
@keyframes slide-in {
  from { opacity: 0; transform: translateX(50px); }
  to { opacity: 1; transform: translateX(0); }
}
nav { padding: 24px; display: flex; justify-content: space-between; align-items: center; }
nav button {
  background: rgba(255, 255, 255, 0.1);
  border: 1px solid rgba(255, 255, 255, 0.3);
  color: #fff;
  padding: 8px 16px;
  border-radius: 6px;
  cursor: pointer;
}
nav button:disabled { opacity: 0.4; cursor: default; }
.dots { display: flex; gap: 8px; }
.dots a { width: 12px; height: 12px; border-radius: 50%; background: rgba(255, 255, 255, 0.4); }
.dots a.active { background: #fff; transform: scale(1.25); }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 6px 12px; }
"#;

/// Render the full page for the slide `state` points at
pub fn render_page(deck: &Deck, state: &NavigationState) -> String {
    let index = state.current();
    let controls = state.controls();

    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );

    let slide_title = deck
        .get(index)
        .map(|slide| slide.title.as_str())
        .unwrap_or_default();
    html_doc.push_str(&format!(
        "<title>{} - {}</title>\n",
        escape_html(deck.title()),
        escape_html(slide_title)
    ));
    html_doc.push_str(&format!("<style>{}</style>\n", STYLE));
    html_doc.push_str("</head>\n<body>\n");

    html_doc.push_str(&format!(
        "<main id=\"deck\" class=\"h-screen\" data-slide=\"{}\" data-count=\"{}\">\n",
        index,
        state.count()
    ));

    // Header with deck title and progress
    html_doc.push_str("<header>\n");
    html_doc.push_str(&format!("<h1>{}</h1>\n", escape_html(deck.title())));
    if let Some(label) = state.progress_label() {
        html_doc.push_str(&format!("<div class=\"progress\">{}</div>\n", label));
    }
    html_doc.push_str("</header>\n");

    // Slide content
    html_doc.push_str("<div class=\"stage\">\n");
    if let Some(slide) = deck.get(index) {
        html_doc.push_str(&format!(
            "<section class=\"slide\" data-title=\"{}\">\n{}</section>\n",
            escape_html(&slide.title),
            slide.content
        ));
    }
    html_doc.push_str("</div>\n");

    // Previous / dots / Next
    html_doc.push_str("<nav>\n");
    html_doc.push_str(&nav_button(
        "previous",
        "Previous",
        index,
        Intent::Previous,
        controls.previous_enabled,
    ));
    html_doc.push_str("<div class=\"dots\">\n");
    for slide in deck.slides() {
        let class = if slide.index == index { " class=\"active\"" } else { "" };
        html_doc.push_str(&format!(
            "<a href=\"/?slide={}\"{} title=\"{}\"></a>\n",
            slide.index,
            class,
            escape_html(&slide.title)
        ));
    }
    html_doc.push_str("</div>\n");
    html_doc.push_str(&nav_button(
        "next",
        "Next",
        index,
        Intent::Next,
        controls.next_enabled,
    ));
    html_doc.push_str("</nav>\n");

    html_doc.push_str("</main>\n");
    html_doc.push_str(&keyboard_script(state));
    html_doc.push_str("</body>\n</html>");

    html_doc
}

fn nav_button(id: &str, label: &str, from: usize, intent: Intent, enabled: bool) -> String {
    if enabled {
        format!(
            "<button id=\"{}\" onclick=\"location.href='{}'\">{}</button>\n",
            id,
            navigate_href(from, intent),
            label
        )
    } else {
        format!("<button id=\"{}\" disabled>{}</button>\n", id, label)
    }
}

/// Link that asks the server to apply `intent` to slide `from`
pub fn navigate_href(from: usize, intent: Intent) -> String {
    format!("/navigate?from={}&{}", from, intent.to_query())
}

/// Key table for this deck, as a JavaScript object literal of key -> step.
/// Only keys with an intent for this slide count are listed.
pub fn key_table(count: usize) -> String {
    let entries: Vec<String> = NAVIGATION_KEYS
        .iter()
        .filter_map(|key| {
            Intent::from_key(key, count).map(|intent| {
                format!(
                    "{}: \"{}\"",
                    serde_json::Value::String((*key).to_string()),
                    intent.to_step()
                )
            })
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Listener that only translates keys into steps and hands them to the server,
/// plus the settled marker set when the entrance animation ends.
///
/// Presses made before the next page arrives are queued and resent together,
/// so every press counts once even though each request replaces the last.
fn keyboard_script(state: &NavigationState) -> String {
    format!(
        r#"<script>
(function () {{
  var KEYS = {keys};
  var FROM = {from};
  var pending = [];
  window.addEventListener('keydown', function (event) {{
    var step = KEYS[event.key];
    if (step === undefined) return;
    event.preventDefault();
    pending.push(step);
    location.href = '/navigate?from=' + FROM + '&steps=' + pending.join(',');
  }});

  var deck = document.querySelector('{root}');
  var slide = deck.querySelector('.slide');
  var settle = function () {{ deck.dataset.settled = 'true'; }};
  if (!slide || !slide.getAnimations || slide.getAnimations().length === 0) {{
    settle();
  }} else {{
    slide.addEventListener('animationend', settle, {{ once: true }});
  }}
}})();
</script>
"#,
        keys = key_table(state.count()),
        from = state.current(),
        root = ROOT_SELECTOR
    )
}

/// Minimal escaping for text and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
