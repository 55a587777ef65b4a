//! Animated text sources for scoreboard lines
//!
//! Handlers build their title and line text from anything implementing
//! [`AnimatedText`]: each update cycle they call [`AnimatedText::next`] and
//! feed the produced frame into an [`Entry`](crate::entry::Entry). Four
//! strategies are provided:
//!
//! - [`StaticText`]: a single fixed frame
//! - [`FrameSequence`]: an explicit frame list with a wrapping cursor
//! - [`HighlightedText`]: one frame per character position, highlighting
//!   that character
//! - [`ScrollingText`]: a fixed-width window sliding across a message
//!
//! The highlight and scroll variants precompute every frame eagerly at
//! construction: memory is bounded by the message length and each step is
//! O(1), which matters when a board ticks several times per second.

use crate::markup;

/// A text source that produces one string per animation frame.
///
/// Implementations are free to be infinite; callers only ever step one
/// frame at a time.
pub trait AnimatedText: Send {
    /// The frame the cursor is on, or `None` if the animation has not
    /// been stepped yet.
    fn current(&self) -> Option<String>;

    /// Advance one frame and produce it, wrapping at the end.
    fn next(&mut self) -> String;

    /// Retreat one frame and produce it, wrapping at the start.
    fn previous(&mut self) -> String;
}

// =============================================================================
// StaticText
// =============================================================================

/// A "one frame" animation: every call produces the same string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    /// Create a static text source.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl AnimatedText for StaticText {
    fn current(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn next(&mut self) -> String {
        self.text.clone()
    }

    fn previous(&mut self) -> String {
        self.text.clone()
    }
}

// =============================================================================
// FrameSequence
// =============================================================================

/// An explicit, ordered list of frames with a wrapping cursor.
///
/// The cursor starts *before* the first frame: [`AnimatedText::current`]
/// is `None` until the first step, `next` lands on frame 0, and
/// `previous` from the start wraps to the last frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<String>,
    cursor: Option<usize>,
}

impl FrameSequence {
    /// Create an empty sequence; frames are added with [`push`](Self::push).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence from a list of frames.
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            cursor: None,
        }
    }

    /// Append a frame to the end of the sequence.
    pub fn push(&mut self, frame: impl Into<String>) {
        self.frames.push(frame.into());
    }

    /// Replace the frame at `index`; out-of-range indices are ignored.
    pub fn replace(&mut self, index: usize, frame: impl Into<String>) {
        if let Some(slot) = self.frames.get_mut(index) {
            *slot = frame.into();
        }
    }

    /// Number of frames in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Read a frame without moving the cursor.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&str> {
        self.frames.get(index).map(String::as_str)
    }

    /// Current cursor position, or `None` before the first step.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Reset the cursor to before the first frame.
    pub fn rewind(&mut self) {
        self.cursor = None;
    }
}

impl AnimatedText for FrameSequence {
    fn current(&self) -> Option<String> {
        self.cursor.and_then(|i| self.frames.get(i).cloned())
    }

    fn next(&mut self) -> String {
        let i = match self.cursor {
            Some(i) if i + 1 < self.frames.len() => i + 1,
            Some(_) | None => 0,
        };
        self.cursor = Some(i);
        self.frames.get(i).cloned().unwrap_or_default()
    }

    fn previous(&mut self) -> String {
        let i = match self.cursor {
            Some(i) if i > 0 => i - 1,
            Some(_) | None => self.frames.len().saturating_sub(1),
        };
        self.cursor = Some(i);
        self.frames.get(i).cloned().unwrap_or_default()
    }
}

// =============================================================================
// HighlightedText
// =============================================================================

/// A letter-highlight cycler: one frame per character position, rendering
/// that character in the highlight style and the rest in the normal style.
///
/// Frames where the character is a space render the whole string
/// unhighlighted, so the highlight appears to skip across words. An
/// optional prefix/suffix wraps every frame unchanged.
#[derive(Clone, Debug)]
pub struct HighlightedText {
    context: String,
    normal_format: String,
    highlight_format: String,
    prefix: String,
    suffix: String,
    frames: FrameSequence,
}

impl HighlightedText {
    /// Create a highlight cycler without affixes.
    pub fn new(
        context: impl Into<String>,
        normal_format: impl Into<String>,
        highlight_format: impl Into<String>,
    ) -> Self {
        Self::with_affixes(context, normal_format, highlight_format, "", "")
    }

    /// Create a highlight cycler wrapping every frame in a fixed
    /// prefix/suffix.
    pub fn with_affixes(
        context: impl Into<String>,
        normal_format: impl Into<String>,
        highlight_format: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        let mut this = Self {
            context: context.into(),
            normal_format: normal_format.into(),
            highlight_format: highlight_format.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            frames: FrameSequence::new(),
        };
        this.generate_frames();
        this
    }

    fn generate_frames(&mut self) {
        let chars: Vec<char> = self.context.chars().collect();
        for (index, &ch) in chars.iter().enumerate() {
            if ch == ' ' {
                self.frames.push(format!(
                    "{}{}{}{}",
                    self.prefix, self.normal_format, self.context, self.suffix
                ));
                continue;
            }
            let before: String = chars[..index].iter().collect();
            let after: String = chars[index + 1..].iter().collect();
            self.frames.push(format!(
                "{}{}{}{}{}{}{}{}",
                self.prefix,
                self.normal_format,
                before,
                self.highlight_format,
                ch,
                self.normal_format,
                after,
                self.suffix
            ));
        }
    }

    /// The unstyled text being highlighted.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Style applied to unhighlighted characters.
    #[must_use]
    pub fn normal_format(&self) -> &str {
        &self.normal_format
    }

    /// Style applied to the highlighted character.
    #[must_use]
    pub fn highlight_format(&self) -> &str {
        &self.highlight_format
    }

    /// Fixed prefix wrapped around every frame.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fixed suffix wrapped around every frame.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Number of precomputed frames (equals the context length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the context was empty (no frames).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl AnimatedText for HighlightedText {
    fn current(&self) -> Option<String> {
        self.frames.current()
    }

    fn next(&mut self) -> String {
        self.frames.next()
    }

    fn previous(&mut self) -> String {
        self.frames.previous()
    }
}

// =============================================================================
// ScrollingText
// =============================================================================

/// A horizontally scrolling window over a message, wrapping around with a
/// gap of spaces between repeats.
///
/// The full cyclic frame sequence is precomputed at construction; stepping
/// is an index increment modulo the frame count, so the sequence is
/// infinite and restartable. Two characters of the requested width are
/// reserved for the carried color escape prepended to every produced
/// frame.
///
/// Because a window boundary can fall in the middle of a color escape,
/// each step applies a correction: a trailing escape character is blanked,
/// and a leading escape consumes its code into the carried color, skips to
/// the following frame, and blanks that frame's first character so the
/// color never visually leaks mid-word across a scroll step.
#[derive(Clone, Debug)]
pub struct ScrollingText {
    frames: Vec<String>,
    position: usize,
    color: String,
    last: Option<String>,
}

impl ScrollingText {
    /// Precompute the cyclic window sequence for `message`.
    ///
    /// `width` is the total visible width of a produced frame (including
    /// the two characters reserved for the color escape, minimum window of
    /// one character); `gap` is the number of space-padded frames between
    /// repeats of the message.
    pub fn new(message: &str, width: usize, gap: usize) -> Self {
        let mut message: Vec<char> = message.chars().collect();
        while message.len() < width {
            message.push(' ');
        }
        // Two columns are taken by the carried color escape.
        let width = width.saturating_sub(2).max(1);
        let len = message.len();

        let substr = |from: usize, to: usize| -> String {
            message[from.min(len)..to.min(len)].iter().collect()
        };

        let tail = len.saturating_sub(width);
        let mut frames = Vec::new();
        // Window slides across the message.
        for i in 0..tail {
            frames.push(substr(i, i + width));
        }
        // Gap of spaces between repeats.
        let mut space = String::new();
        for i in 0..gap {
            frames.push(format!("{}{}", substr(tail + i.min(width), len), space));
            if space.len() < width {
                space.push(' ');
            }
        }
        // Wrap back around to the start of the message.
        for i in 0..width.saturating_sub(gap) {
            frames.push(format!(
                "{}{}{}",
                substr(tail + gap + i, len),
                space,
                substr(0, i)
            ));
        }
        // Join the gap back up with the restarting message.
        for i in 0..gap {
            if i > space.len() {
                break;
            }
            frames.push(format!(
                "{}{}",
                &space[..space.len() - i],
                substr(0, width - gap.min(width) + i)
            ));
        }
        if frames.is_empty() {
            frames.push(" ".repeat(width));
        }

        Self {
            frames,
            position: 0,
            color: markup::RESET.to_string(),
            last: None,
        }
    }

    /// Number of precomputed frames in one full cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; construction guarantees at least one frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn advance(&mut self) -> Vec<char> {
        let frame = &self.frames[self.position % self.frames.len()];
        self.position += 1;
        frame.chars().collect()
    }
}

impl AnimatedText for ScrollingText {
    fn current(&self) -> Option<String> {
        self.last.clone()
    }

    fn next(&mut self) -> String {
        let mut frame = self.advance();
        if frame.last() == Some(&markup::COLOR_CHAR) {
            let end = frame.len() - 1;
            frame[end] = ' ';
        }
        if frame.first() == Some(&markup::COLOR_CHAR) {
            if let Some(code) = frame.get(1).copied().and_then(markup::color_code) {
                self.color = format!("{}{}", markup::COLOR_CHAR, code);
                frame = self.advance();
                if frame.first().is_some_and(|c| *c != ' ') {
                    frame[0] = ' ';
                }
            }
        }
        let out = format!("{}{}", self.color, frame.iter().collect::<String>());
        self.last = Some(out.clone());
        out
    }

    fn previous(&mut self) -> String {
        let len = self.frames.len();
        // Step the cursor back behind the previously produced frame, then
        // reuse the forward path so the color correction stays uniform.
        self.position = if self.last.is_none() {
            len - 1
        } else {
            (self.position + len.saturating_sub(2)) % len
        };
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========================================================================
    // StaticText
    // ========================================================================

    #[test]
    fn test_static_text_never_changes() {
        let mut text = StaticText::new("&6Lobby");
        assert_eq!(text.current(), Some("&6Lobby".to_string()));
        assert_eq!(text.next(), "&6Lobby");
        assert_eq!(text.previous(), "&6Lobby");
        assert_eq!(text.next(), "&6Lobby");
    }

    // ========================================================================
    // FrameSequence
    // ========================================================================

    #[test]
    fn test_frame_sequence_starts_before_first_frame() {
        let seq = FrameSequence::from_frames(["a", "b", "c"]);
        assert_eq!(seq.current(), None);
        assert_eq!(seq.cursor(), None);
    }

    #[test]
    fn test_frame_sequence_next_wraps() {
        let mut seq = FrameSequence::from_frames(["a", "b", "c"]);
        assert_eq!(seq.next(), "a");
        assert_eq!(seq.next(), "b");
        assert_eq!(seq.next(), "c");
        assert_eq!(seq.next(), "a");
        assert_eq!(seq.current(), Some("a".to_string()));
    }

    #[test]
    fn test_frame_sequence_previous_wraps_from_start() {
        let mut seq = FrameSequence::from_frames(["a", "b", "c"]);
        assert_eq!(seq.previous(), "c");
        assert_eq!(seq.previous(), "b");
        assert_eq!(seq.previous(), "a");
        assert_eq!(seq.previous(), "c");
    }

    #[test]
    fn test_frame_sequence_editing() {
        let mut seq = FrameSequence::new();
        seq.push("a");
        seq.push("b");
        seq.replace(1, "B");
        seq.replace(9, "ignored");
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.frame(1), Some("B"));
        assert_eq!(seq.frame(9), None);
    }

    #[test]
    fn test_frame_sequence_rewind() {
        let mut seq = FrameSequence::from_frames(["a", "b"]);
        seq.next();
        seq.rewind();
        assert_eq!(seq.current(), None);
        assert_eq!(seq.next(), "a");
    }

    #[test]
    fn test_empty_frame_sequence_is_harmless() {
        let mut seq = FrameSequence::new();
        assert_eq!(seq.current(), None);
        assert_eq!(seq.next(), "");
        assert_eq!(seq.previous(), "");
    }

    // ========================================================================
    // HighlightedText
    // ========================================================================

    #[test]
    fn test_highlight_frame_count_matches_length() {
        let text = HighlightedText::new("SERVER", "&7", "&e");
        assert_eq!(text.len(), 6);
    }

    #[test]
    fn test_highlight_moves_one_character_per_frame() {
        let mut text = HighlightedText::new("abc", "&7", "&e");
        assert_eq!(text.next(), "&7&ea&7bc");
        assert_eq!(text.next(), "&7a&eb&7c");
        assert_eq!(text.next(), "&7ab&ec&7");
        // Wraps back to the first character.
        assert_eq!(text.next(), "&7&ea&7bc");
    }

    #[test]
    fn test_highlight_skips_spaces() {
        let mut text = HighlightedText::new("a b", "&7", "&e");
        assert_eq!(text.next(), "&7&ea&7 b");
        assert_eq!(text.next(), "&7a b");
        assert_eq!(text.next(), "&7a &eb&7");
    }

    #[test]
    fn test_highlight_wraps_affixes_around_every_frame() {
        let mut text = HighlightedText::with_affixes("ab", "&7", "&e", "> ", " <");
        assert_eq!(text.next(), "> &7&ea&7b <");
        assert_eq!(text.next(), "> &7a&eb&7 <");
    }

    #[test]
    fn test_highlight_accessors() {
        let text = HighlightedText::with_affixes("hi", "&7", "&e", "[", "]");
        assert_eq!(text.context(), "hi");
        assert_eq!(text.normal_format(), "&7");
        assert_eq!(text.highlight_format(), "&e");
        assert_eq!(text.prefix(), "[");
        assert_eq!(text.suffix(), "]");
    }

    // ========================================================================
    // ScrollingText
    // ========================================================================

    #[test]
    fn test_scroll_pads_short_messages_to_width() {
        let mut scroll = ScrollingText::new("hi", 10, 2);
        let first = scroll.next();
        // Two chars of carried color plus the window width.
        assert_eq!(first.chars().count(), 10);
    }

    #[test]
    fn test_scroll_frames_have_uniform_length() {
        let mut scroll = ScrollingText::new("The quick brown fox", 12, 4);
        let expected = scroll.next().chars().count();
        for _ in 0..scroll.len() * 2 {
            assert_eq!(scroll.next().chars().count(), expected);
        }
    }

    #[test]
    fn test_scroll_never_emits_dangling_escape() {
        let mut scroll = ScrollingText::new("§aGREEN §cRED §rPLAIN", 9, 3);
        for _ in 0..scroll.len() * 2 {
            let frame = scroll.next();
            assert_ne!(frame.chars().last(), Some(markup::COLOR_CHAR));
        }
    }

    #[test]
    fn test_scroll_reference_sequence() {
        // Hand-derived from the reference generator for message "§aAB",
        // width 4 (window 2), gap 1. The precomputed raw frames are
        // ["§a", "aA", "AB", "B ", " §"]; the leading escape of the first
        // frame is consumed into the carried color, and the trailing
        // escape of the last frame is blanked.
        let mut scroll = ScrollingText::new("§aAB", 4, 1);
        assert_eq!(scroll.len(), 5);
        assert_eq!(scroll.next(), "§a A");
        assert_eq!(scroll.next(), "§aAB");
        assert_eq!(scroll.next(), "§aB ");
        assert_eq!(scroll.next(), "§a  ");
        // The cycle repeats: the color escape is consumed again.
        assert_eq!(scroll.next(), "§a A");
    }

    #[test]
    fn test_scroll_current_tracks_last_produced_frame() {
        let mut scroll = ScrollingText::new("message", 6, 1);
        assert_eq!(scroll.current(), None);
        let frame = scroll.next();
        assert_eq!(scroll.current(), Some(frame));
    }

    #[test]
    fn test_scroll_previous_before_start_produces_last_frame() {
        let mut scroll = ScrollingText::new("plain text here", 8, 2);
        let frame = scroll.previous();
        assert_eq!(frame.chars().count(), 8);
        assert_eq!(scroll.current(), Some(frame));
    }

    #[test]
    fn test_scroll_previous_steps_back() {
        let mut scroll = ScrollingText::new("plain text here", 8, 2);
        let a = scroll.next();
        let _b = scroll.next();
        assert_eq!(scroll.previous(), a);
    }

    #[test]
    fn test_scroll_gap_larger_than_width_still_cycles() {
        let mut scroll = ScrollingText::new("tiny", 4, 9);
        let expected = scroll.next().chars().count();
        for _ in 0..scroll.len() * 2 {
            assert_eq!(scroll.next().chars().count(), expected);
        }
    }
}
