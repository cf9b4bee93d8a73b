//! Single-line editor behind the admin console prompt.

/// Text typed at the console prompt. Editing happens at the end of the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    text: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Replace the line, e.g. with a moderation template.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Take the trimmed line for submission and clear the prompt.
    ///
    /// Returns `None` (and still clears) when only whitespace was typed.
    pub fn take(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut ed = LineEditor::new();
        for c in "mem!".chars() {
            ed.insert(c);
        }
        ed.backspace();
        assert_eq!(ed.as_str(), "mem");
        ed.backspace();
        ed.backspace();
        ed.backspace();
        ed.backspace();
        assert!(ed.is_empty());
    }

    #[test]
    fn take_trims_and_clears() {
        let mut ed = LineEditor::new();
        ed.set("  say \"hello\"  ");
        assert_eq!(ed.take().as_deref(), Some("say \"hello\""));
        assert!(ed.is_empty());
    }

    #[test]
    fn blank_line_is_not_submitted() {
        let mut ed = LineEditor::new();
        ed.set("   ");
        assert_eq!(ed.take(), None);
        assert!(ed.is_empty());
    }

    #[test]
    fn multibyte_backspace_removes_whole_char() {
        let mut ed = LineEditor::new();
        ed.set("say ü");
        ed.backspace();
        assert_eq!(ed.as_str(), "say ");
    }
}
