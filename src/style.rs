//! Frequency-to-style mapping.
//!
//! A pure linear interpolation from `(count, max_frequency)` to a font size
//! and opacity. The range endpoints are presentation policy, not constants,
//! so they live in [`StyleRange`] and default to the 10–36 px / 0.5–1.0
//! span used by the overlay presenter.

/// Output range for frequency weighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleRange {
    /// Font size for count 1, in CSS px.
    pub min_size_px: f32,
    /// Font size for the maximum count, in CSS px.
    pub max_size_px: f32,
    /// Opacity for count 1.
    pub min_opacity: f32,
    /// Opacity for the maximum count.
    pub max_opacity: f32,
}

impl Default for StyleRange {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            max_size_px: 36.0,
            min_opacity: 0.5,
            max_opacity: 1.0,
        }
    }
}

/// Visual weight derived from one frequency entry. Recomputed on demand,
/// never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordStyle {
    /// Effective font size in CSS px.
    pub font_size_px: f32,
    /// Effective opacity.
    pub opacity: f32,
}

impl StyleRange {
    /// Interpolate a style for `count` occurrences against the observed
    /// maximum.
    ///
    /// `t` is defined as 0 when `max_frequency <= 1`, so a page where every
    /// word occurs once renders entirely at the minimum weight instead of
    /// dividing by zero.
    pub fn style_for(&self, count: u32, max_frequency: u32) -> WordStyle {
        let t = if max_frequency <= 1 {
            0.0
        } else {
            let span = (max_frequency - 1) as f32;
            (count.saturating_sub(1) as f32 / span).clamp(0.0, 1.0)
        };
        WordStyle {
            font_size_px: self.min_size_px + t * (self.max_size_px - self.min_size_px),
            opacity: self.min_opacity + t * (self.max_opacity - self.min_opacity),
        }
    }
}
