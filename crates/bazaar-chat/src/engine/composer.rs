//! Message composer: free text plus canned quick replies.

/// The canned quick-reply strings offered next to the input field.
pub const QUICK_REPLIES: &[&str] = &[
    "Is it available?",
    "What is the last price?",
    "Where can I pick it up?",
    "Can you ship it?",
];

/// Input buffer for the chat screen.
///
/// Submission policy: the buffer is trimmed, cleared unconditionally, and
/// an empty result is rejected silently — no error surfaces. A failed send
/// is reported through the history entry's delivery state, never by
/// requeueing text here.
#[derive(Debug, Default)]
pub struct Composer {
    input: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Replace the buffer with a quick reply. Returns false for an
    /// out-of-range index.
    pub fn apply_quick_reply(&mut self, index: usize) -> bool {
        match QUICK_REPLIES.get(index) {
            Some(reply) => {
                self.input = (*reply).to_string();
                true
            }
            None => false,
        }
    }

    /// Take the trimmed submission, clearing the buffer either way.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        self.input.clear();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_trims() {
        let mut composer = Composer::new();
        composer.set_input("  hello there  ");
        assert_eq!(composer.take_submission().as_deref(), Some("hello there"));
        assert_eq!(composer.input(), "");
    }

    #[test]
    fn test_empty_submission_rejected_silently() {
        let mut composer = Composer::new();
        composer.set_input("   ");
        assert_eq!(composer.take_submission(), None);
        assert_eq!(composer.input(), "");
    }

    #[test]
    fn test_quick_reply_fills_input() {
        let mut composer = Composer::new();
        assert!(composer.apply_quick_reply(0));
        assert_eq!(composer.input(), "Is it available?");
        assert!(!composer.apply_quick_reply(QUICK_REPLIES.len()));
    }
}
