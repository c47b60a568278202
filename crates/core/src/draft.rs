use thiserror::Error;

/// Normalized input for creating a task from any client (CLI, UI).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, completed: bool) -> Self {
        Self {
            title: title.into(),
            completed,
        }
    }

    /// Build a draft from whitespace-separated words, as the CLI receives them.
    pub fn from_words(words: &[String]) -> Self {
        Self::new(words.join(" "), false)
    }

    /// Returns the trimmed title, or an error when nothing is left.
    pub fn require_title(&self) -> Result<&str, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        Ok(title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Title should not be empty")]
    EmptyTitle,
}
