//! Word splitting, qualification, and normalization.
//!
//! A fragment is split at word-boundary positions (transitions between
//! word-characters and everything else). A token qualifies as a word when it
//! is entirely alphabetic — ASCII letters or the accented range
//! U+00C0..=U+017F — and at least [`TokenizerConfig::min_word_chars`]
//! characters long. Qualifying tokens are emitted lowercased; everything
//! else (punctuation, digits, short words) is dropped without error.

/// Tokenizer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Minimum qualifying word length, counted in characters (not bytes).
    pub min_word_chars: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_word_chars: 4 }
    }
}

/// Splits fragments into qualifying, lowercase-normalized words.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordTokenizer {
    config: TokenizerConfig,
}

impl WordTokenizer {
    /// Create a tokenizer with explicit config.
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    /// Emit every qualifying word of `fragment`, lowercased, in order.
    ///
    /// The borrowed word is only valid for the duration of the callback; the
    /// single scratch buffer is reused across words.
    pub fn tokenize_with<F: FnMut(&str)>(&self, fragment: &str, mut on_word: F) {
        let mut scratch = String::with_capacity(16);
        for token in split_word_tokens(fragment) {
            if !self.qualifies(token) {
                continue;
            }
            scratch.clear();
            scratch.extend(token.chars().flat_map(char::to_lowercase));
            on_word(&scratch);
        }
    }

    /// Collect the qualifying words of `fragment` as owned strings.
    pub fn tokenize(&self, fragment: &str) -> Vec<String> {
        let mut out = Vec::with_capacity(8);
        self.tokenize_with(fragment, |word| out.push(word.to_string()));
        out
    }

    fn qualifies(&self, token: &str) -> bool {
        let mut chars = 0usize;
        for ch in token.chars() {
            if !is_cloud_letter(ch) {
                return false;
            }
            chars += 1;
        }
        chars >= self.config.min_word_chars
    }
}

/// Iterate maximal runs of word characters in `fragment`.
fn split_word_tokens(fragment: &str) -> impl Iterator<Item = &str> {
    fragment
        .split(|ch: char| !is_boundary_word_char(ch))
        .filter(|token| !token.is_empty())
}

/// Word characters for boundary splitting: regex `\w` plus the accented
/// range, so accented words survive splitting as single tokens.
fn is_boundary_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || is_accented(ch)
}

/// Characters accepted by the qualification filter.
fn is_cloud_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || is_accented(ch)
}

/// Latin-1 Supplement / Latin Extended-A range U+00C0..=U+017F.
fn is_accented(ch: char) -> bool {
    ('\u{00C0}'..='\u{017F}').contains(&ch)
}
