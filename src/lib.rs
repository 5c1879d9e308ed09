//! Streaming word-frequency cloud engine for HTML pages.
//!
//! Extracts the visible text of a document, splits it into words, counts
//! case-insensitive word frequencies, and maps each frequency to a visual
//! weight (font size, opacity) by linear interpolation. Rendering backends
//! live in separate crates; this crate produces the frequency table and the
//! per-word styles.
//!
//! # Usage
//!
//! ```rust
//! use page_cloud::{CloudOptions, WordCloud};
//!
//! # fn example() -> Result<(), page_cloud::CloudError> {
//! let html = b"<html><body><p>Paper boats, paper boats.</p></body></html>";
//! let cloud = WordCloud::from_html_bytes(html, CloudOptions::default())?;
//! assert_eq!(cloud.max_frequency(), 2);
//! for (word, count, style) in cloud.iter_styled() {
//!     println!("{} x{} -> {}px", word, count, style.font_size_px);
//! }
//! # Ok(())
//! # }
//! ```

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

pub mod cloud;
pub mod error;
pub mod extract;
pub mod frequency;
pub mod style;
pub mod tokenize;

pub use cloud::{CloudBuilder, CloudOptions, WordCloud};
pub use error::{CloudError, ErrorLimitContext, ErrorPhase};
pub use extract::{extract_fragments_with, ExtractLimits, FragmentSource, HtmlDocument};
pub use frequency::{FrequencyEntry, FrequencyTable, MatchPolicy, WordFrequencies};
pub use style::{StyleRange, WordStyle};
pub use tokenize::{TokenizerConfig, WordTokenizer};
