//! Visible-text fragment extraction from HTML/XHTML bytes.
//!
//! A streaming event walk over the markup that yields the text a reader
//! would actually see: `script`, `style`, `head`, and `noscript` subtrees
//! are skipped wholesale, adjacent text/CDATA/entity events merge into one
//! fragment per text run, and whitespace collapses outside preformatted
//! contexts. The walk is the only part of the pipeline coupled to a
//! document format; everything downstream consumes plain fragments through
//! [`FragmentSource`], so tests drive the core with string slices.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use smallvec::SmallVec;

use crate::error::{CloudError, ErrorPhase};

/// Limits for document walking and fragment growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Maximum bytes accepted for one document.
    pub max_document_bytes: usize,
    /// Maximum UTF-8 bytes kept for a single fragment; longer fragments are
    /// truncated at a character boundary with a warning.
    pub max_fragment_bytes: usize,
    /// Maximum tracked element nesting depth; deeper elements flatten with
    /// a warning instead of failing.
    pub max_nesting: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 8 * 1024 * 1024,
            max_fragment_bytes: 64 * 1024,
            max_nesting: 256,
        }
    }
}

/// Ordered, finite producer of raw text fragments.
///
/// Implemented by [`HtmlDocument`] for markup input and by plain string
/// slices for pre-extracted text and tests.
pub trait FragmentSource {
    /// Visit every fragment in document order.
    fn visit_fragments<F: FnMut(&str)>(&mut self, on_fragment: F) -> Result<(), CloudError>;
}

impl<S: AsRef<str>> FragmentSource for &[S] {
    fn visit_fragments<F: FnMut(&str)>(&mut self, mut on_fragment: F) -> Result<(), CloudError> {
        for fragment in self.iter() {
            on_fragment(fragment.as_ref());
        }
        Ok(())
    }
}

impl<S: AsRef<str>> FragmentSource for Vec<S> {
    fn visit_fragments<F: FnMut(&str)>(&mut self, mut on_fragment: F) -> Result<(), CloudError> {
        for fragment in self.iter() {
            on_fragment(fragment.as_ref());
        }
        Ok(())
    }
}

/// An HTML/XHTML document plus extraction settings.
#[derive(Clone, Debug)]
pub struct HtmlDocument {
    bytes: Vec<u8>,
    limits: ExtractLimits,
    lenient: bool,
}

impl HtmlDocument {
    /// Wrap document bytes with default limits and lenient parsing.
    pub fn new(bytes: Vec<u8>) -> Result<Self, CloudError> {
        Self::with_limits(bytes, ExtractLimits::default())
    }

    /// Wrap document bytes with explicit limits.
    pub fn with_limits(bytes: Vec<u8>, limits: ExtractLimits) -> Result<Self, CloudError> {
        if bytes.len() > limits.max_document_bytes {
            return Err(CloudError::new(
                ErrorPhase::Extract,
                "EXTRACT_DOCUMENT_BYTES_LIMIT",
                format!(
                    "Document exceeds max_document_bytes ({} > {})",
                    bytes.len(),
                    limits.max_document_bytes
                ),
            )
            .with_limit("max_document_bytes", bytes.len(), limits.max_document_bytes));
        }
        Ok(Self {
            bytes,
            limits,
            lenient: true,
        })
    }

    /// Fail on malformed markup instead of stopping the walk early.
    pub fn strict(mut self) -> Self {
        self.lenient = false;
        self
    }
}

impl FragmentSource for HtmlDocument {
    fn visit_fragments<F: FnMut(&str)>(&mut self, on_fragment: F) -> Result<(), CloudError> {
        extract_fragments_with(&self.bytes, &self.limits, self.lenient, on_fragment)
    }
}

/// Walk `html` and stream every visible-text fragment to `on_fragment`.
///
/// In lenient mode (the default for [`HtmlDocument`]) unclosed elements,
/// unmatched end tags, and stray ampersands are tolerated, and the first
/// unrecoverable parse error ends the walk after emitting everything seen
/// so far. Strict mode surfaces the error instead.
pub fn extract_fragments_with<F: FnMut(&str)>(
    html: &[u8],
    limits: &ExtractLimits,
    lenient: bool,
    mut on_fragment: F,
) -> Result<(), CloudError> {
    if html.len() > limits.max_document_bytes {
        return Err(CloudError::new(
            ErrorPhase::Extract,
            "EXTRACT_DOCUMENT_BYTES_LIMIT",
            format!(
                "Document exceeds max_document_bytes ({} > {})",
                html.len(),
                limits.max_document_bytes
            ),
        )
        .with_limit("max_document_bytes", html.len(), limits.max_document_bytes));
    }

    let mut reader = Reader::from_reader(html);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = !lenient;
        config.allow_unmatched_ends = lenient;
        config.allow_dangling_amp = lenient;
    }

    let mut buf = Vec::with_capacity(64);
    let mut stack: SmallVec<[String; 16]> = SmallVec::new();
    let mut pending = String::with_capacity(64);
    let mut entity_buf = String::with_capacity(16);
    let mut skip_depth = 0usize;
    let mut nesting_overflow = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                flush_pending(&mut pending, &stack, limits, &mut on_fragment);
                let Some(tag) = decode_name(&reader, e.name().as_ref(), lenient)? else {
                    buf.clear();
                    continue;
                };
                if should_skip_tag(&tag) {
                    skip_depth += 1;
                    buf.clear();
                    continue;
                }
                if skip_depth > 0 || is_void_tag(&tag) {
                    buf.clear();
                    continue;
                }
                if stack.len() >= limits.max_nesting {
                    nesting_overflow += 1;
                    log::warn!(
                        "Element nesting depth {} exceeds max_nesting ({}); flattening",
                        stack.len() + nesting_overflow,
                        limits.max_nesting
                    );
                } else {
                    stack.push(tag);
                }
            }
            Ok(Event::Empty(_)) => {
                flush_pending(&mut pending, &stack, limits, &mut on_fragment);
            }
            Ok(Event::End(e)) => {
                flush_pending(&mut pending, &stack, limits, &mut on_fragment);
                let Some(tag) = decode_name(&reader, e.name().as_ref(), lenient)? else {
                    buf.clear();
                    continue;
                };
                if should_skip_tag(&tag) {
                    skip_depth = skip_depth.saturating_sub(1);
                    buf.clear();
                    continue;
                }
                if skip_depth > 0 {
                    buf.clear();
                    continue;
                }
                if nesting_overflow > 0 {
                    nesting_overflow -= 1;
                } else if stack.last().is_some_and(|last| *last == tag) {
                    stack.pop();
                }
            }
            Ok(Event::Text(e)) => {
                if skip_depth > 0 {
                    buf.clear();
                    continue;
                }
                match e.decode() {
                    Ok(text) => pending.push_str(text.as_ref()),
                    Err(err) => {
                        if !lenient {
                            return Err(CloudError::new(
                                ErrorPhase::Extract,
                                "EXTRACT_DECODE_ERROR",
                                format!("Decode error: {:?}", err),
                            )
                            .with_source("text node")
                            .with_offset(reader_offset(&reader)));
                        }
                        log::warn!("Skipping undecodable text node: {:?}", err);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if skip_depth > 0 {
                    buf.clear();
                    continue;
                }
                match reader.decoder().decode(&e) {
                    Ok(text) => pending.push_str(text.as_ref()),
                    Err(err) => {
                        if !lenient {
                            return Err(CloudError::new(
                                ErrorPhase::Extract,
                                "EXTRACT_DECODE_ERROR",
                                format!("Decode error: {:?}", err),
                            )
                            .with_source("cdata")
                            .with_offset(reader_offset(&reader)));
                        }
                        log::warn!("Skipping undecodable CDATA section: {:?}", err);
                    }
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if skip_depth > 0 {
                    buf.clear();
                    continue;
                }
                let name = match e.decode() {
                    Ok(name) => name,
                    Err(err) => {
                        if !lenient {
                            return Err(CloudError::new(
                                ErrorPhase::Extract,
                                "EXTRACT_DECODE_ERROR",
                                format!("Decode error: {:?}", err),
                            )
                            .with_source("entity reference")
                            .with_offset(reader_offset(&reader)));
                        }
                        buf.clear();
                        continue;
                    }
                };
                entity_buf.clear();
                entity_buf.push('&');
                entity_buf.push_str(name.as_ref());
                entity_buf.push(';');
                match quick_xml::escape::unescape(&entity_buf) {
                    Ok(resolved) => pending.push_str(resolved.as_ref()),
                    Err(err) => {
                        if !lenient {
                            return Err(CloudError::new(
                                ErrorPhase::Extract,
                                "EXTRACT_ENTITY_ERROR",
                                format!("Unresolvable entity {}: {:?}", entity_buf, err),
                            )
                            .with_source("entity reference")
                            .with_offset(reader_offset(&reader)));
                        }
                        // Named HTML entities (nbsp and friends) are outside
                        // the XML predefined set; they separate words, so a
                        // space keeps token boundaries intact.
                        log::debug!("Unresolvable entity {}; treating as space", entity_buf);
                        pending.push(' ');
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {
                flush_pending(&mut pending, &stack, limits, &mut on_fragment);
            }
            Err(err) => {
                if !lenient {
                    return Err(CloudError::new(
                        ErrorPhase::Extract,
                        "EXTRACT_MARKUP_ERROR",
                        format!("Markup error: {:?}", err),
                    )
                    .with_offset(reader_offset(&reader)));
                }
                log::warn!(
                    "Markup error at byte {}; ending walk early: {:?}",
                    reader_offset(&reader),
                    err
                );
                break;
            }
        }
        buf.clear();
    }

    flush_pending(&mut pending, &stack, limits, &mut on_fragment);
    Ok(())
}

/// Emit the accumulated text run as one fragment, if it has visible content.
fn flush_pending<F: FnMut(&str)>(
    pending: &mut String,
    stack: &[String],
    limits: &ExtractLimits,
    on_fragment: &mut F,
) {
    if pending.is_empty() {
        return;
    }
    let preserve_ws = is_preformatted_context(stack);
    let mut fragment = collapse_whitespace(pending, preserve_ws);
    pending.clear();
    if fragment.trim().is_empty() {
        return;
    }
    if fragment.len() > limits.max_fragment_bytes {
        log::warn!(
            "Fragment exceeds max_fragment_bytes ({} > {}); truncating",
            fragment.len(),
            limits.max_fragment_bytes
        );
        let mut cut = limits.max_fragment_bytes;
        while cut > 0 && !fragment.is_char_boundary(cut) {
            cut -= 1;
        }
        fragment.truncate(cut);
        if fragment.trim().is_empty() {
            return;
        }
    }
    on_fragment(&fragment);
}

fn decode_name(
    reader: &Reader<&[u8]>,
    raw: &[u8],
    lenient: bool,
) -> Result<Option<String>, CloudError> {
    let decoded = match reader.decoder().decode(raw) {
        Ok(decoded) => decoded,
        Err(err) => {
            if !lenient {
                return Err(CloudError::new(
                    ErrorPhase::Extract,
                    "EXTRACT_DECODE_ERROR",
                    format!("Decode error: {:?}", err),
                )
                .with_source("tag name")
                .with_offset(reader_offset(reader)));
            }
            log::warn!("Skipping element with undecodable name: {:?}", err);
            return Ok(None);
        }
    };
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(Some(local_name.to_ascii_lowercase()))
}

fn reader_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

/// Containers whose text is never visible page text.
fn should_skip_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "head" | "noscript")
}

/// HTML void elements: no content, no end tag, never pushed on the stack.
fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_preformatted_context(stack: &[String]) -> bool {
    stack
        .iter()
        .any(|tag| matches!(tag.as_str(), "pre" | "code" | "kbd" | "samp" | "textarea"))
}

fn collapse_whitespace(text: &str, preserve: bool) -> String {
    if preserve {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut prev_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(ch);
            prev_space = false;
        }
    }
    if result.ends_with(' ') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(html: &str) -> Vec<String> {
        let mut out = Vec::new();
        extract_fragments_with(html.as_bytes(), &ExtractLimits::default(), true, |f| {
            out.push(f.to_string())
        })
        .expect("lenient extraction should not fail");
        out
    }

    #[test]
    fn emits_one_fragment_per_text_run() {
        assert_eq!(
            fragments("<html><body><p>alpha</p><p>beta gamma</p></body></html>"),
            vec!["alpha", "beta gamma"]
        );
    }

    #[test]
    fn script_and_style_subtrees_are_invisible() {
        let html = "<html><head><title>skip me</title></head><body>\
                    <style>.x { color: red }</style>\
                    <script>var skipped = 1;</script>\
                    <noscript>enable scripts</noscript>\
                    <p>visible</p></body></html>";
        assert_eq!(fragments(html), vec!["visible"]);
    }

    #[test]
    fn nested_markup_inside_skipped_subtrees_stays_skipped() {
        let html = "<body><noscript><p>hidden <b>words</b></p></noscript>after</body>";
        assert_eq!(fragments(html), vec!["after"]);
    }

    #[test]
    fn entities_join_the_surrounding_text_run() {
        assert_eq!(fragments("<p>caf&#233; &amp; bar</p>"), vec!["café & bar"]);
    }

    #[test]
    fn unknown_entities_become_spaces_in_lenient_mode() {
        assert_eq!(fragments("<p>one&nbsp;two</p>"), vec!["one two"]);
    }

    #[test]
    fn whitespace_collapses_outside_preformatted_context() {
        assert_eq!(fragments("<p>  spaced \n\t out  </p>"), vec!["spaced out"]);
        assert_eq!(fragments("<pre>  a \n b  </pre>"), vec!["  a \n b  "]);
    }

    #[test]
    fn inline_elements_split_text_runs() {
        assert_eq!(
            fragments("<p>before <b>bold</b> after</p>"),
            vec!["before", "bold", "after"]
        );
    }

    #[test]
    fn void_elements_do_not_derail_the_walk() {
        assert_eq!(
            fragments("<p>line one<br>line two<img src=\"x.png\">tail</p>"),
            vec!["line one", "line two", "tail"]
        );
    }

    #[test]
    fn empty_documents_yield_no_fragments() {
        assert!(fragments("").is_empty());
        assert!(fragments("<html><body></body></html>").is_empty());
        assert!(fragments("<p>   \n </p>").is_empty());
    }

    #[test]
    fn lenient_walk_keeps_fragments_seen_before_a_markup_error() {
        let html = "<p>kept words</p><p>tail without close";
        assert_eq!(fragments(html), vec!["kept words", "tail without close"]);
    }

    #[test]
    fn strict_mode_reports_mismatched_end_tags() {
        let html = "<div><p>word</div>";
        let err = extract_fragments_with(
            html.as_bytes(),
            &ExtractLimits::default(),
            false,
            |_fragment| {},
        )
        .expect_err("strict extraction should fail");
        assert_eq!(err.code, "EXTRACT_MARKUP_ERROR");
        assert_eq!(err.phase, ErrorPhase::Extract);
    }

    #[test]
    fn document_limit_is_a_structured_error() {
        let limits = ExtractLimits {
            max_document_bytes: 8,
            ..ExtractLimits::default()
        };
        let err = extract_fragments_with(b"<p>0123456789</p>", &limits, true, |_fragment| {})
            .expect_err("document over limit should fail");
        assert_eq!(err.code, "EXTRACT_DOCUMENT_BYTES_LIMIT");
        let limit = err.limit.expect("limit context expected");
        assert_eq!(limit.kind, "max_document_bytes");
        assert_eq!(limit.limit, 8);
    }

    #[test]
    fn oversized_fragments_truncate_at_a_character_boundary() {
        let limits = ExtractLimits {
            max_fragment_bytes: 4,
            ..ExtractLimits::default()
        };
        let mut out = Vec::new();
        extract_fragments_with(
            "<p>caf\u{e9}caf\u{e9}</p>".as_bytes(),
            &limits,
            true,
            |f| out.push(f.to_string()),
        )
        .expect("extraction should succeed");
        // A 4-byte cut would split the first "é"; the cut backs up to a boundary.
        assert_eq!(out, vec!["caf"]);
    }

    #[test]
    fn html_document_source_applies_its_limits_up_front() {
        let limits = ExtractLimits {
            max_document_bytes: 4,
            ..ExtractLimits::default()
        };
        let err = HtmlDocument::with_limits(b"<p>word</p>".to_vec(), limits)
            .expect_err("oversized document should be rejected");
        assert_eq!(err.code, "EXTRACT_DOCUMENT_BYTES_LIMIT");
    }

    #[test]
    fn slice_sources_visit_in_order() {
        let mut source: &[&str] = &["one", "two"];
        let mut seen = Vec::new();
        source
            .visit_fragments(|f| seen.push(f.to_string()))
            .expect("slice source cannot fail");
        assert_eq!(seen, vec!["one", "two"]);
    }
}
