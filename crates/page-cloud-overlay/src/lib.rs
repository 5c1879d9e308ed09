//! Dismissible HTML overlay presenter for `page-cloud`.
//!
//! Turns a finished [`WordCloud`] into the overlay a reader sees: a fixed,
//! centered panel with a heading, a close control, and one list item per
//! word sized and faded by frequency. Everything interpolated into markup is
//! escaped or sanitized here; the core pipeline never touches markup
//! concerns. A JSON payload export is provided for non-HTML consumers.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use page_cloud::{CloudError, ErrorPhase, WordCloud};
use serde::Serialize;

/// Overlay presentation options.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Heading shown above the word list.
    pub title: String,
    /// Class prefix namespacing every overlay selector.
    pub class_prefix: String,
    /// Stacking order for the panel. Host pages pile up surprisingly high.
    pub z_index: u64,
    /// Panel max width/height as a viewport percentage, clamped to 10..=100.
    pub max_extent_percent: u8,
    /// Word ink color (CSS color token).
    pub text_color: String,
    /// Panel background color (CSS color token).
    pub background: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            title: "Word cloud for this page".to_string(),
            class_prefix: "page-cloud".to_string(),
            z_index: 9_999_999_999,
            max_extent_percent: 85,
            text_color: "#103f5e".to_string(),
            background: "#fff".to_string(),
        }
    }
}

impl OverlayConfig {
    /// Override the heading.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn sanitized(&self) -> SanitizedConfig<'_> {
        let class_prefix = if is_css_identifier(&self.class_prefix) {
            self.class_prefix.as_str()
        } else {
            log::warn!(
                "Overlay class_prefix '{}' is not a CSS identifier; using default",
                self.class_prefix
            );
            "page-cloud"
        };
        let text_color = sanitize_color(&self.text_color, "#103f5e");
        let background = sanitize_color(&self.background, "#fff");
        SanitizedConfig {
            title: &self.title,
            class_prefix,
            z_index: self.z_index,
            max_extent_percent: self.max_extent_percent.clamp(10, 100),
            text_color,
            background,
        }
    }
}

struct SanitizedConfig<'a> {
    title: &'a str,
    class_prefix: &'a str,
    z_index: u64,
    max_extent_percent: u8,
    text_color: &'a str,
    background: &'a str,
}

/// Render the overlay snippet: panel markup, scoped stylesheet, and the
/// dismissal script. Injectable into any page body.
pub fn render_overlay(cloud: &WordCloud, config: &OverlayConfig) -> String {
    let cfg = config.sanitized();
    let prefix = cfg.class_prefix;
    let mut out = String::with_capacity(2048);

    out.push_str(&format!("<div class=\"{}-panel\">\n", prefix));
    out.push_str(&format!("  <h1>{}</h1>\n", escape_html(cfg.title)));
    out.push_str(&format!(
        "  <a href=\"#\" class=\"{}-close\">Close</a>\n  <ul>\n",
        prefix
    ));
    for (word, _, style) in cloud.iter_styled() {
        out.push_str(&format!(
            "    <li style=\"font-size:{:.1}px;opacity:{:.2}\">{}</li>\n",
            style.font_size_px,
            style.opacity,
            escape_html(word)
        ));
    }
    out.push_str("  </ul>\n</div>\n");

    out.push_str(&overlay_stylesheet(&cfg));
    out.push_str(&dismissal_script(prefix));
    out
}

/// Render a complete standalone HTML document embedding the overlay, for
/// previews and file output.
pub fn render_preview_document(cloud: &WordCloud, config: &OverlayConfig) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    out.push_str(&format!("  <title>{}</title>\n", escape_html(&config.title)));
    out.push_str("</head>\n<body>\n");
    out.push_str(&render_overlay(cloud, config));
    out.push_str("</body>\n</html>\n");
    out
}

fn overlay_stylesheet(cfg: &SanitizedConfig<'_>) -> String {
    let prefix = cfg.class_prefix;
    format!(
        "<style>\n\
         .{p}-panel {{\n\
         \x20 position: fixed;\n\
         \x20 top: 50%;\n\
         \x20 left: 50%;\n\
         \x20 max-width: {extent}%;\n\
         \x20 max-height: {extent}%;\n\
         \x20 transform: translate(-50%, -50%);\n\
         \x20 padding: 30px;\n\
         \x20 box-shadow: 0 0 10px 10px rgba(0, 0, 0, 0.5);\n\
         \x20 border-radius: 10px;\n\
         \x20 background-color: {background};\n\
         \x20 z-index: {z};\n\
         \x20 overflow: auto;\n\
         }}\n\
         .{p}-panel h1 {{\n\
         \x20 padding-right: 40px;\n\
         \x20 margin: 0 0 10px;\n\
         \x20 font-size: 36px;\n\
         \x20 text-transform: uppercase;\n\
         }}\n\
         .{p}-panel li {{\n\
         \x20 display: inline-block;\n\
         \x20 padding: 0 4px;\n\
         \x20 color: {ink};\n\
         }}\n\
         .{p}-close {{\n\
         \x20 display: block;\n\
         \x20 position: absolute;\n\
         \x20 top: 20px;\n\
         \x20 right: 20px;\n\
         \x20 width: 40px;\n\
         \x20 height: 40px;\n\
         \x20 text-indent: -999px;\n\
         \x20 text-decoration: none;\n\
         \x20 overflow: hidden;\n\
         \x20 transition: all 0.3s ease;\n\
         }}\n\
         .{p}-close:before, .{p}-close:after {{\n\
         \x20 content: '';\n\
         \x20 display: block;\n\
         \x20 position: absolute;\n\
         \x20 top: 18px;\n\
         \x20 left: 0;\n\
         \x20 width: 40px;\n\
         \x20 height: 4px;\n\
         \x20 transform: rotate(45deg);\n\
         \x20 background-color: {ink};\n\
         }}\n\
         .{p}-close:after {{\n\
         \x20 transform: rotate(-45deg);\n\
         }}\n\
         .{p}-close:hover, .{p}-close:focus {{\n\
         \x20 transform: scale(1.2);\n\
         }}\n\
         </style>\n",
        p = prefix,
        extent = cfg.max_extent_percent,
        background = cfg.background,
        ink = cfg.text_color,
        z = cfg.z_index,
    )
}

fn dismissal_script(prefix: &str) -> String {
    format!(
        "<script>\n\
         (function () {{\n\
         \x20 var panel = document.querySelector('.{p}-panel');\n\
         \x20 var close = document.querySelector('.{p}-close');\n\
         \x20 if (!panel || !close) {{ return; }}\n\
         \x20 close.addEventListener('click', function (event) {{\n\
         \x20   event.preventDefault();\n\
         \x20   panel.parentNode.removeChild(panel);\n\
         \x20 }});\n\
         }})();\n\
         </script>\n",
        p = prefix,
    )
}

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn is_css_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Accept simple CSS color tokens (`#abc`, `rgb(...)`, named colors); fall
/// back to `default` for anything that could carry declaration syntax.
fn sanitize_color<'a>(value: &'a str, default: &'a str) -> &'a str {
    let ok = !value.is_empty()
        && value.len() <= 64
        && value.chars().all(|ch| {
            ch.is_ascii_alphanumeric()
                || matches!(ch, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-')
        });
    if ok {
        value
    } else {
        log::warn!("Overlay color '{}' rejected; using default", value);
        default
    }
}

/// One styled word of the JSON export.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordPayload {
    /// Lowercase-normalized word.
    pub word: String,
    /// Occurrence count.
    pub count: u32,
    /// Interpolated font size in CSS px.
    pub font_size_px: f32,
    /// Interpolated opacity.
    pub opacity: f32,
}

/// JSON export of a styled cloud.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CloudPayload {
    /// Styled words in lexicographic order.
    pub words: Vec<WordPayload>,
    /// Largest count present (1 for an empty cloud).
    pub max_frequency: u32,
}

impl CloudPayload {
    /// Snapshot a cloud into its payload form.
    pub fn from_cloud(cloud: &WordCloud) -> Self {
        let words = cloud
            .iter_styled()
            .map(|(word, count, style)| WordPayload {
                word: word.to_string(),
                count,
                font_size_px: style.font_size_px,
                opacity: style.opacity,
            })
            .collect();
        Self {
            words,
            max_frequency: cloud.max_frequency(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, CloudError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            CloudError::new(
                ErrorPhase::Render,
                "RENDER_JSON_ERROR",
                format!("JSON serialization failed: {}", e),
            )
        })
    }
}
