//! Pipeline orchestration: fragments in, styled word cloud out.

use crate::error::CloudError;
use crate::extract::{extract_fragments_with, ExtractLimits, FragmentSource};
use crate::frequency::{FrequencyTable, MatchPolicy, WordFrequencies};
use crate::style::{StyleRange, WordStyle};
use crate::tokenize::{TokenizerConfig, WordTokenizer};

/// Pipeline options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudOptions {
    /// Word splitting and qualification settings.
    pub tokenizer: TokenizerConfig,
    /// Aggregation match policy.
    pub match_policy: MatchPolicy,
    /// Frequency-to-style output range.
    pub style: StyleRange,
    /// Document walking limits.
    pub limits: ExtractLimits,
    /// Keep walking past malformed markup instead of failing. HTML scraped
    /// from real pages is rarely well-formed.
    pub lenient_html: bool,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            match_policy: MatchPolicy::default(),
            style: StyleRange::default(),
            limits: ExtractLimits::default(),
            lenient_html: true,
        }
    }
}

/// Incremental cloud construction over a fragment stream.
#[derive(Clone, Debug)]
pub struct CloudBuilder {
    options: CloudOptions,
    tokenizer: WordTokenizer,
    frequencies: WordFrequencies,
}

impl CloudBuilder {
    /// Create a builder with explicit options.
    pub fn new(options: CloudOptions) -> Self {
        Self {
            options,
            tokenizer: WordTokenizer::new(options.tokenizer),
            frequencies: WordFrequencies::new(options.match_policy),
        }
    }

    /// Tokenize one fragment and fold its words into the running counts.
    pub fn push_fragment(&mut self, fragment: &str) {
        let frequencies = &mut self.frequencies;
        self.tokenizer
            .tokenize_with(fragment, |word| frequencies.add(word));
    }

    /// Drain a fragment source into the running counts.
    pub fn push_source<S: FragmentSource>(&mut self, source: &mut S) -> Result<(), CloudError> {
        let frequencies = &mut self.frequencies;
        let tokenizer = &self.tokenizer;
        source.visit_fragments(|fragment| {
            tokenizer.tokenize_with(fragment, |word| frequencies.add(word));
        })
    }

    /// Distinct words recorded so far.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when nothing qualified yet.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Finish the pass and freeze the table.
    pub fn finish(self) -> WordCloud {
        let table = self.frequencies.into_table();
        log::debug!(
            "word cloud aggregated {} distinct words (max frequency {})",
            table.len(),
            table.max_frequency()
        );
        WordCloud {
            table,
            style: self.options.style,
        }
    }
}

/// Finished, immutable word cloud: the frequency table plus the style range
/// used to weight it.
#[derive(Clone, Debug, PartialEq)]
pub struct WordCloud {
    table: FrequencyTable,
    style: StyleRange,
}

impl WordCloud {
    /// Run the full pipeline over HTML bytes.
    pub fn from_html_bytes(html: &[u8], options: CloudOptions) -> Result<Self, CloudError> {
        let mut builder = CloudBuilder::new(options);
        {
            let frequencies = &mut builder.frequencies;
            let tokenizer = &builder.tokenizer;
            extract_fragments_with(html, &options.limits, options.lenient_html, |fragment| {
                tokenizer.tokenize_with(fragment, |word| frequencies.add(word));
            })?;
        }
        Ok(builder.finish())
    }

    /// Run the pipeline over pre-extracted fragments.
    pub fn from_fragments<I, S>(fragments: I, options: CloudOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = CloudBuilder::new(options);
        for fragment in fragments {
            builder.push_fragment(fragment.as_ref());
        }
        builder.finish()
    }

    /// The frozen frequency table.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// The style range used for weighting.
    pub fn style_range(&self) -> StyleRange {
        self.style
    }

    /// Largest count present, or 1 for an empty cloud.
    pub fn max_frequency(&self) -> u32 {
        self.table.max_frequency()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when no word qualified.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Style for an arbitrary count against this cloud's maximum.
    pub fn style_for(&self, count: u32) -> WordStyle {
        self.style.style_for(count, self.table.max_frequency())
    }

    /// Iterate `(word, count, style)` in lexicographic word order.
    pub fn iter_styled(&self) -> impl Iterator<Item = (&str, u32, WordStyle)> {
        let max = self.table.max_frequency();
        self.table
            .iter()
            .map(move |(word, count)| (word, count, self.style.style_for(count, max)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_one_shot_agree() {
        let fragments = ["tide pools", "tide charts and tide tables"];
        let mut builder = CloudBuilder::new(CloudOptions::default());
        for fragment in fragments {
            builder.push_fragment(fragment);
        }
        let incremental = builder.finish();
        let one_shot = WordCloud::from_fragments(fragments, CloudOptions::default());
        assert_eq!(incremental, one_shot);
        assert_eq!(one_shot.table().get("tide"), Some(3));
    }

    #[test]
    fn push_source_drains_slices() {
        let mut source: &[&str] = &["first words", "other words"];
        let mut builder = CloudBuilder::new(CloudOptions::default());
        builder
            .push_source(&mut source)
            .expect("slice source cannot fail");
        let cloud = builder.finish();
        assert_eq!(cloud.table().get("words"), Some(2));
        assert_eq!(cloud.max_frequency(), 2);
    }

    #[test]
    fn styled_iteration_follows_table_order() {
        let cloud = WordCloud::from_fragments(
            ["west wind", "west reef"],
            CloudOptions::default(),
        );
        let styled: Vec<(&str, u32)> = cloud.iter_styled().map(|(w, c, _)| (w, c)).collect();
        assert_eq!(styled, vec![("reef", 1), ("west", 2), ("wind", 1)]);
        let (_, _, west_style) = cloud
            .iter_styled()
            .find(|(w, _, _)| *w == "west")
            .expect("west should be present");
        assert_eq!(west_style.font_size_px, cloud.style_range().max_size_px);
    }

    #[test]
    fn empty_input_degrades_to_an_empty_cloud() {
        let cloud = WordCloud::from_fragments(Vec::<String>::new(), CloudOptions::default());
        assert!(cloud.is_empty());
        assert_eq!(cloud.max_frequency(), 1);
        assert_eq!(cloud.style_for(1).font_size_px, 10.0);
        assert_eq!(cloud.iter_styled().count(), 0);
    }

    #[test]
    fn html_pipeline_skips_invisible_text() {
        let html = b"<html><head><style>body { color: red }</style></head>\
                     <body><p>Coral coral reef</p><script>var coral;</script></body></html>";
        let cloud = WordCloud::from_html_bytes(html, CloudOptions::default())
            .expect("lenient pipeline should succeed");
        assert_eq!(cloud.table().get("coral"), Some(2));
        assert_eq!(cloud.table().get("reef"), Some(1));
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn options_propagate_to_every_stage() {
        let options = CloudOptions {
            tokenizer: TokenizerConfig { min_word_chars: 3 },
            match_policy: MatchPolicy::Substring,
            style: StyleRange {
                min_size_px: 12.0,
                max_size_px: 20.0,
                min_opacity: 0.4,
                max_opacity: 0.9,
            },
            ..CloudOptions::default()
        };
        let cloud = WordCloud::from_fragments(["fox foxes fox"], options);
        // min length 3 admits "fox"; substring policy folds "foxes" into it.
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.table().get("fox"), Some(3));
        assert_eq!(cloud.style_for(3).font_size_px, 20.0);
        assert_eq!(cloud.style_for(1).opacity, 0.4);
    }
}
