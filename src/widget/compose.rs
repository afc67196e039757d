//! Compose box: draft text and auto-resize.

use serde::Serialize;

/// Sizing rules for the compose textarea, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMetrics {
    /// Intrinsic height of an empty, single-line textarea.
    pub min_height: u32,
    /// Hard cap; past it the textarea scrolls internally.
    pub max_height: u32,
    /// Height of one text line, used when the browser sends no measurement.
    pub line_height: u32,
}

impl Default for InputMetrics {
    fn default() -> Self {
        Self {
            min_height: 40,
            max_height: 120,
            line_height: 20,
        }
    }
}

impl InputMetrics {
    /// Height the textarea should take for content of `content_height` pixels.
    #[must_use]
    pub fn fit(&self, content_height: u32) -> u32 {
        content_height.clamp(self.min_height, self.max_height.max(self.min_height))
    }

    /// Estimate content height from the number of lines in `text`.
    #[must_use]
    pub fn estimate(&self, text: &str) -> u32 {
        let lines = u32::try_from(text.split('\n').count()).unwrap_or(u32::MAX);
        let padding = self.min_height.saturating_sub(self.line_height);
        padding.saturating_add(lines.saturating_mul(self.line_height))
    }
}

/// Uncommitted compose-box state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    text: String,
    height: u32,
    overflowing: bool,
    /// Bumped every time the draft is cleared by a send.
    generation: u64,
}

impl Draft {
    #[must_use]
    pub fn new(metrics: &InputMetrics) -> Self {
        Self {
            text: String::new(),
            height: metrics.min_height,
            overflowing: false,
            generation: 0,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether content exceeds the height cap.
    #[must_use]
    pub fn overflowing(&self) -> bool {
        self.overflowing
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the draft text without resizing.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a literal newline (Shift+Enter).
    pub fn insert_newline(&mut self) {
        self.text.push('\n');
    }

    /// Empty the draft after a send.
    pub fn clear(&mut self) {
        self.text.clear();
        self.generation += 1;
    }

    /// Recompute the height for the current text.
    ///
    /// `scroll_height` is the browser's measurement of the content after the
    /// height was reset to its intrinsic minimum.
    pub fn auto_resize(&mut self, metrics: &InputMetrics, scroll_height: Option<u32>) {
        let content = scroll_height.unwrap_or_else(|| metrics.estimate(&self.text));
        self.height = metrics.fit(content);
        self.overflowing = content > metrics.max_height;
    }
}

/// Trimmed text to send, or `None` when only whitespace remains.
#[must_use]
pub fn submission(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_clamps_between_min_and_cap() {
        let metrics = InputMetrics::default();
        assert_eq!(metrics.fit(0), 40);
        assert_eq!(metrics.fit(64), 64);
        assert_eq!(metrics.fit(500), 120);
    }

    #[test]
    fn test_auto_resize_with_measurement() {
        let metrics = InputMetrics::default();
        let mut draft = Draft::new(&metrics);

        draft.set_text("a\nb\nc");
        draft.auto_resize(&metrics, Some(80));
        assert_eq!(draft.height(), 80);
        assert!(!draft.overflowing());

        draft.auto_resize(&metrics, Some(300));
        assert_eq!(draft.height(), 120);
        assert!(draft.overflowing());
    }

    #[test]
    fn test_auto_resize_estimates_from_lines() {
        let metrics = InputMetrics::default();
        let mut draft = Draft::new(&metrics);

        draft.set_text("one line");
        draft.auto_resize(&metrics, None);
        assert_eq!(draft.height(), 40);

        draft.set_text("1\n2\n3");
        draft.auto_resize(&metrics, None);
        assert_eq!(draft.height(), 80);

        draft.set_text("1\n2\n3\n4\n5\n6\n7");
        draft.auto_resize(&metrics, None);
        assert_eq!(draft.height(), 120);
        assert!(draft.overflowing());
    }

    #[test]
    fn test_clear_shrinks_back_and_bumps_generation() {
        let metrics = InputMetrics::default();
        let mut draft = Draft::new(&metrics);
        draft.set_text("1\n2\n3\n4");
        draft.auto_resize(&metrics, None);
        assert!(draft.height() > metrics.min_height);

        draft.clear();
        draft.auto_resize(&metrics, None);
        assert_eq!(draft.text(), "");
        assert_eq!(draft.height(), metrics.min_height);
        assert_eq!(draft.generation(), 1);
    }

    #[test]
    fn test_submission_trims_and_rejects_whitespace() {
        for blank in ["", " ", "\n\t  \n"] {
            assert_eq!(submission(blank), None);
        }
        assert_eq!(submission("  hello \n"), Some("hello"));
        assert_eq!(submission(" a\n b "), Some("a\n b"));
    }
}
