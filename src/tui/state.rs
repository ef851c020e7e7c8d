use crate::model::{default_questions, GeneratedLogo, LogoId, Screen};
use crate::questionnaire::Questionnaire;
use std::time::Instant;

/// Rotating status lines shown while a generation call is in flight. Purely
/// cosmetic; rotation is driven by the render tick, not by actual progress.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Consulting with our virtual design expert…",
    "Sketching initial concepts…",
    "Applying advanced color theory…",
    "Rendering high-resolution previews…",
    "Perfecting the final details…",
    "Finalizing your brand identity…",
];

const LOADING_ROTATE_MS: u128 = 2500;

pub struct UiState {
    pub screen: Screen,
    pub results: Vec<GeneratedLogo>,
    pub saved: Vec<GeneratedLogo>,
    pub error: String,
    pub info: String,
    pub show_help: bool,

    pub flow: Questionnaire,

    /// Cursor into the collection shown on the results/saved screen.
    pub selected: usize,
    /// Logo currently picked for refinement/editing, with its feedback buffer.
    pub feedback_target: Option<LogoId>,
    pub feedback: String,

    pub loading_since: Instant,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Welcome,
            results: Vec::new(),
            saved: Vec::new(),
            error: String::new(),
            info: String::new(),
            show_help: false,
            flow: Questionnaire::new(default_questions()),
            selected: 0,
            feedback_target: None,
            feedback: String::new(),
            loading_since: Instant::now(),
        }
    }
}

impl UiState {
    /// The collection the current screen displays.
    pub fn displayed(&self) -> &[GeneratedLogo] {
        match self.screen {
            Screen::Saved => &self.saved,
            _ => &self.results,
        }
    }

    pub fn selected_logo(&self) -> Option<&GeneratedLogo> {
        self.displayed().get(self.selected)
    }

    /// Begin feedback entry for the selected logo. Selecting resets the
    /// feedback buffer.
    pub fn open_feedback(&mut self) {
        if let Some(logo) = self.selected_logo() {
            self.feedback_target = Some(logo.id);
            self.feedback.clear();
        }
    }

    pub fn cancel_feedback(&mut self) {
        self.feedback_target = None;
        self.feedback.clear();
    }

    /// Take the feedback if it is non-empty after trimming, clearing the
    /// local selection. Returns `None` (and keeps the modal open) otherwise.
    pub fn take_feedback(&mut self) -> Option<(LogoId, String)> {
        let id = self.feedback_target?;
        let trimmed = self.feedback.trim();
        if trimmed.is_empty() {
            return None;
        }
        let feedback = trimmed.to_string();
        self.cancel_feedback();
        Some((id, feedback))
    }

    pub fn clamp_selection(&mut self) {
        let len = self.displayed().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn loading_message(&self) -> &'static str {
        let idx = (self.loading_since.elapsed().as_millis() / LOADING_ROTATE_MS) as usize
            % LOADING_MESSAGES.len();
        LOADING_MESSAGES[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logo(id: u64) -> GeneratedLogo {
        GeneratedLogo {
            id: LogoId(id),
            prompt: format!("p{id}"),
            style: "Modern".into(),
            image_data: String::new(),
            created_utc: String::new(),
        }
    }

    #[test]
    fn feedback_requires_non_empty_trimmed_text() {
        let mut state = UiState {
            results: vec![logo(1)],
            screen: Screen::Results,
            ..Default::default()
        };
        state.open_feedback();
        state.feedback = "   ".into();
        assert!(state.take_feedback().is_none());
        // Whitespace-only submission keeps the modal open.
        assert!(state.feedback_target.is_some());

        state.feedback = "  bolder lines  ".into();
        let (id, feedback) = state.take_feedback().unwrap();
        assert_eq!(id, LogoId(1));
        assert_eq!(feedback, "bolder lines");
        assert!(state.feedback_target.is_none());
    }

    #[test]
    fn selecting_resets_the_feedback_buffer() {
        let mut state = UiState {
            results: vec![logo(1), logo(2)],
            screen: Screen::Results,
            ..Default::default()
        };
        state.open_feedback();
        state.feedback = "old text".into();
        state.cancel_feedback();
        state.selected = 1;
        state.open_feedback();
        assert_eq!(state.feedback_target, Some(LogoId(2)));
        assert!(state.feedback.is_empty());
    }

    #[test]
    fn selection_clamps_after_shrink() {
        let mut state = UiState {
            results: vec![logo(1), logo(2), logo(3)],
            screen: Screen::Results,
            selected: 2,
            ..Default::default()
        };
        state.results.truncate(1);
        state.clamp_selection();
        assert_eq!(state.selected, 0);
    }
}
