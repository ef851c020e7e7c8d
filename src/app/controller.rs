//! Screen state machine and command handling.

use crate::generate::LogoGenerator;
use crate::model::{GeneratedLogo, LogoId, Screen};
use crate::storage::SavedLogoStore;
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by presentation layers.
#[derive(Debug, Clone)]
pub enum AppCommand {
    StartDesigning,
    ViewSaved,
    SubmitAnswers(Vec<String>),
    /// Refine an ephemeral result; feedback is non-empty post-trim.
    Refine {
        id: LogoId,
        feedback: String,
    },
    /// Refine a saved logo and replace it in the saved set.
    EditSaved {
        id: LogoId,
        feedback: String,
    },
    Save(LogoId),
    Delete(LogoId),
    AcknowledgeError,
    Reset,
    Quit,
}

/// State updates emitted to presentation layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Screen(Screen),
    Results(Vec<GeneratedLogo>),
    Saved(Vec<GeneratedLogo>),
    Error(String),
    Info(String),
}

pub struct AppController<G> {
    generator: G,
    store: SavedLogoStore,
    event_tx: UnboundedSender<AppEvent>,
    screen: Screen,
    /// Screen to return to when an error is acknowledged: whatever was
    /// current before the failing operation entered Loading.
    return_to: Screen,
    results: Vec<GeneratedLogo>,
    last_error: Option<String>,
}

impl<G: LogoGenerator> AppController<G> {
    pub fn new(generator: G, store: SavedLogoStore, event_tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            generator,
            store,
            event_tx,
            screen: Screen::Welcome,
            return_to: Screen::Welcome,
            results: Vec::new(),
            last_error: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn results(&self) -> &[GeneratedLogo] {
        &self.results
    }

    pub fn store(&self) -> &SavedLogoStore {
        &self.store
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Emit the initial screen and saved collection so a freshly attached
    /// presentation layer starts in sync.
    pub fn announce(&self) {
        self.set_screen_event(self.screen);
        self.emit_saved();
    }

    /// Handle one command. Returns `false` on `Quit`.
    pub async fn handle(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::StartDesigning => self.set_screen(Screen::Questionnaire),
            AppCommand::ViewSaved => self.set_screen(Screen::Saved),
            AppCommand::SubmitAnswers(answers) => self.submit_answers(answers).await,
            AppCommand::Refine { id, feedback } => self.refine(id, &feedback).await,
            AppCommand::EditSaved { id, feedback } => self.edit_saved(id, &feedback).await,
            AppCommand::Save(id) => self.save(id),
            AppCommand::Delete(id) => self.delete(id),
            AppCommand::AcknowledgeError => self.acknowledge_error(),
            AppCommand::Reset => self.reset(),
            AppCommand::Quit => return false,
        }
        true
    }

    async fn submit_answers(&mut self, answers: Vec<String>) {
        self.enter_loading(Screen::Questionnaire);
        self.results.clear();
        self.emit_results();

        let prompts = match self.generator.generate_prompts(&answers).await {
            Ok(p) => p,
            Err(e) => {
                self.fail(format!("Failed to generate logo concepts: {e}"));
                return;
            }
        };

        if !prompts.is_empty() {
            let batch = self.generator.generate_images(&prompts).await;
            let had_failures = batch.had_failures();
            self.results = batch.logos;
            self.emit_results();

            if had_failures && self.results.is_empty() {
                let detail = batch
                    .last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".into());
                self.fail(format!("No images could be generated: {detail}"));
                return;
            }
            if had_failures {
                let _ = self.event_tx.send(AppEvent::Info(
                    "Some images could not be generated. Results may be incomplete.".into(),
                ));
            }
        }

        // An empty prompt list without an error still lands on the results
        // screen, which then shows an empty collection.
        self.set_screen(Screen::Results);
    }

    /// Refine-then-regenerate an ephemeral result, replacing it in place.
    async fn refine(&mut self, id: LogoId, feedback: &str) {
        let Some(index) = self.results.iter().position(|l| l.id == id) else {
            return;
        };
        let original = self.results[index].prompt.clone();
        self.enter_loading(Screen::Results);

        match self.refine_and_render(&original, feedback).await {
            Ok(new_logo) => {
                self.results[index] = new_logo;
                self.emit_results();
                self.set_screen(Screen::Results);
            }
            Err(msg) => self.fail(msg),
        }
    }

    /// Refine-then-regenerate a saved logo: the old entry is deleted and the
    /// replacement saved in its stead.
    async fn edit_saved(&mut self, id: LogoId, feedback: &str) {
        let Some(original) = self.store.get(id).map(|l| l.prompt.clone()) else {
            return;
        };
        self.enter_loading(Screen::Saved);

        match self.refine_and_render(&original, feedback).await {
            Ok(new_logo) => {
                let replaced = self
                    .store
                    .delete(id)
                    .and_then(|()| self.store.save(new_logo));
                if let Err(e) = replaced {
                    self.fail(format!("Failed to update the saved logo: {e:#}"));
                    return;
                }
                self.emit_saved();
                self.set_screen(Screen::Saved);
            }
            Err(msg) => self.fail(msg),
        }
    }

    /// Shared refine chain: one replacement prompt, then one image for it.
    async fn refine_and_render(
        &mut self,
        original: &str,
        feedback: &str,
    ) -> Result<GeneratedLogo, String> {
        let refined = self
            .generator
            .refine_prompt(original, feedback)
            .await
            .map_err(|e| format!("Failed to refine the logo concept: {e}"))?;

        let mut batch = self.generator.generate_images(&[refined]).await;
        if batch.logos.is_empty() {
            let detail = batch
                .last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".into());
            return Err(format!("Failed to render the refined logo: {detail}"));
        }
        Ok(batch.logos.remove(0))
    }

    fn save(&mut self, id: LogoId) {
        let Some(logo) = self.results.iter().find(|l| l.id == id).cloned() else {
            return;
        };
        // Forwarded verbatim to the store; never changes the screen.
        match self.store.save(logo) {
            Ok(()) => self.emit_saved(),
            Err(e) => {
                let _ = self
                    .event_tx
                    .send(AppEvent::Info(format!("Save failed: {e:#}")));
            }
        }
    }

    fn delete(&mut self, id: LogoId) {
        match self.store.delete(id) {
            Ok(()) => self.emit_saved(),
            Err(e) => {
                let _ = self
                    .event_tx
                    .send(AppEvent::Info(format!("Delete failed: {e:#}")));
            }
        }
    }

    fn acknowledge_error(&mut self) {
        if self.screen == Screen::Error {
            self.last_error = None;
            self.set_screen(self.return_to);
        }
    }

    fn reset(&mut self) {
        self.results.clear();
        self.last_error = None;
        self.emit_results();
        self.set_screen(Screen::Welcome);
    }

    fn enter_loading(&mut self, origin: Screen) {
        self.return_to = origin;
        self.set_screen(Screen::Loading);
    }

    fn fail(&mut self, message: String) {
        self.last_error = Some(message.clone());
        let _ = self.event_tx.send(AppEvent::Error(message));
        self.screen = Screen::Error;
        self.set_screen_event(Screen::Error);
    }

    fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.set_screen_event(screen);
    }

    fn set_screen_event(&self, screen: Screen) {
        let _ = self.event_tx.send(AppEvent::Screen(screen));
    }

    fn emit_results(&self) {
        let _ = self.event_tx.send(AppEvent::Results(self.results.clone()));
    }

    fn emit_saved(&self) {
        let _ = self
            .event_tx
            .send(AppEvent::Saved(self.store.logos().to_vec()));
    }
}

/// Drive the controller from a command channel until `Quit` or the channel
/// closes.
pub async fn run_controller<G: LogoGenerator>(
    mut controller: AppController<G>,
    mut cmd_rx: UnboundedReceiver<AppCommand>,
) -> Result<()> {
    controller.announce();
    while let Some(cmd) = cmd_rx.recv().await {
        if !controller.handle(cmd).await {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateError, ImageBatch, LogoGenerator};
    use crate::model::{now_utc_rfc3339, LogoPrompt};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Scripted generator: prompt/refine outcomes are taken once, image
    /// generation fails for prompts listed in `fail_images`.
    #[derive(Default)]
    struct MockGenerator {
        prompts: Mutex<Option<Result<Vec<LogoPrompt>, GenerateError>>>,
        refined: Mutex<Option<Result<LogoPrompt, GenerateError>>>,
        fail_images: HashSet<String>,
    }

    impl MockGenerator {
        fn with_prompts(prompts: Vec<(&str, &str)>) -> Self {
            let prompts = prompts
                .into_iter()
                .map(|(p, s)| LogoPrompt {
                    prompt: p.into(),
                    style: s.into(),
                })
                .collect();
            Self {
                prompts: Mutex::new(Some(Ok(prompts))),
                ..Default::default()
            }
        }

        fn failing_images(mut self, prompts: &[&str]) -> Self {
            self.fail_images = prompts.iter().map(|p| p.to_string()).collect();
            self
        }

        fn with_refined(self, prompt: &str, style: &str) -> Self {
            *self.refined.lock().unwrap() = Some(Ok(LogoPrompt {
                prompt: prompt.into(),
                style: style.into(),
            }));
            self
        }
    }

    impl LogoGenerator for MockGenerator {
        async fn generate_prompts(
            &self,
            _answers: &[String],
        ) -> Result<Vec<LogoPrompt>, GenerateError> {
            self.prompts
                .lock()
                .unwrap()
                .take()
                .expect("unexpected generate_prompts call")
        }

        async fn generate_images(&self, prompts: &[LogoPrompt]) -> ImageBatch {
            let mut batch = ImageBatch::default();
            for p in prompts {
                if self.fail_images.contains(&p.prompt) {
                    batch.failed += 1;
                    batch.last_error = Some(GenerateError::NoImage);
                } else {
                    batch.logos.push(GeneratedLogo {
                        id: LogoId::generate(),
                        prompt: p.prompt.clone(),
                        style: p.style.clone(),
                        image_data: "data:image/png;base64,UE5H".into(),
                        created_utc: now_utc_rfc3339(),
                    });
                }
            }
            batch
        }

        async fn refine_prompt(
            &self,
            _original: &str,
            _feedback: &str,
        ) -> Result<LogoPrompt, GenerateError> {
            self.refined
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GenerateError::NoImage))
        }
    }

    fn controller(
        dir: &TempDir,
        gen: MockGenerator,
    ) -> (
        AppController<MockGenerator>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = SavedLogoStore::open(dir.path());
        (AppController::new(gen, store, tx), rx)
    }

    fn answers() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()]
    }

    const PROMPTS4: [(&str, &str); 4] = [
        ("p1", "Minimalist"),
        ("p2", "Modern"),
        ("p3", "Abstract"),
        ("p4", "Classic"),
    ];

    #[tokio::test]
    async fn welcome_transitions() {
        let dir = TempDir::new().unwrap();
        let (mut c, _rx) = controller(&dir, MockGenerator::default());
        assert_eq!(c.screen(), Screen::Welcome);
        c.handle(AppCommand::StartDesigning).await;
        assert_eq!(c.screen(), Screen::Questionnaire);
        c.handle(AppCommand::Reset).await;
        c.handle(AppCommand::ViewSaved).await;
        assert_eq!(c.screen(), Screen::Saved);
    }

    #[tokio::test]
    async fn submit_with_full_success_lands_on_results() {
        let dir = TempDir::new().unwrap();
        let (mut c, _rx) = controller(&dir, MockGenerator::with_prompts(PROMPTS4.to_vec()));
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Results);
        assert_eq!(c.results().len(), 4);
        assert_eq!(c.results()[2].prompt, "p3");
    }

    #[tokio::test]
    async fn one_failed_image_is_partial_success_not_error() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator::with_prompts(PROMPTS4.to_vec()).failing_images(&["p2"]);
        let (mut c, mut rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Results);
        assert_eq!(c.results().len(), 3);
        // Survivors keep source order with the failed position skipped.
        let prompts: Vec<_> = c.results().iter().map(|l| l.prompt.as_str()).collect();
        assert_eq!(prompts, ["p1", "p3", "p4"]);

        let mut saw_info = false;
        while let Ok(ev) = rx.try_recv() {
            if matches!(ev, AppEvent::Info(_)) {
                saw_info = true;
            }
        }
        assert!(saw_info, "partial failure should surface an info message");
    }

    #[tokio::test]
    async fn all_images_failing_is_an_error() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator::with_prompts(PROMPTS4.to_vec())
            .failing_images(&["p1", "p2", "p3", "p4"]);
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Error);
        assert!(c.results().is_empty());
    }

    #[tokio::test]
    async fn prompt_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator {
            prompts: Mutex::new(Some(Err(GenerateError::Api {
                status: 429,
                message: "quota".into(),
            }))),
            ..Default::default()
        };
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Error);
        assert!(c.last_error().unwrap().contains("logo concepts"));
    }

    #[tokio::test]
    async fn empty_prompt_list_without_error_shows_empty_results() {
        let dir = TempDir::new().unwrap();
        let (mut c, _rx) = controller(&dir, MockGenerator::with_prompts(vec![]));
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Results);
        assert!(c.results().is_empty());
        assert!(c.last_error().is_none());
    }

    #[tokio::test]
    async fn acknowledge_returns_to_pre_loading_screen() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator {
            prompts: Mutex::new(Some(Err(GenerateError::NoImage))),
            ..Default::default()
        };
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Error);
        c.handle(AppCommand::AcknowledgeError).await;
        assert_eq!(c.screen(), Screen::Questionnaire);
        assert!(c.last_error().is_none());
    }

    #[tokio::test]
    async fn refine_replaces_entry_in_place() {
        let dir = TempDir::new().unwrap();
        let gen =
            MockGenerator::with_prompts(PROMPTS4.to_vec()).with_refined("p2-refined", "Bolder");
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        let target = c.results()[1].id;

        c.handle(AppCommand::Refine {
            id: target,
            feedback: "more contrast".into(),
        })
        .await;
        assert_eq!(c.screen(), Screen::Results);
        let prompts: Vec<_> = c.results().iter().map(|l| l.prompt.as_str()).collect();
        // The replacement keeps the original's position; its prompt differs.
        assert_eq!(prompts, ["p1", "p2-refined", "p3", "p4"]);
        assert_ne!(c.results()[1].id, target);
    }

    #[tokio::test]
    async fn refine_failure_goes_to_error_and_back_to_results() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator::with_prompts(PROMPTS4.to_vec());
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        let target = c.results()[0].id;

        // No scripted refinement: the mock reports failure.
        c.handle(AppCommand::Refine {
            id: target,
            feedback: "x".into(),
        })
        .await;
        assert_eq!(c.screen(), Screen::Error);
        c.handle(AppCommand::AcknowledgeError).await;
        assert_eq!(c.screen(), Screen::Results);
        // The original entry is untouched.
        assert_eq!(c.results()[0].id, target);
    }

    #[tokio::test]
    async fn save_and_delete_do_not_change_screen() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator::with_prompts(PROMPTS4.to_vec());
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        let id = c.results()[0].id;

        c.handle(AppCommand::Save(id)).await;
        assert_eq!(c.screen(), Screen::Results);
        assert_eq!(c.store().logos().len(), 1);

        // Saving the same logo twice keeps a single entry.
        c.handle(AppCommand::Save(id)).await;
        assert_eq!(c.store().logos().len(), 1);

        c.handle(AppCommand::Delete(id)).await;
        assert_eq!(c.screen(), Screen::Results);
        assert!(c.store().logos().is_empty());
    }

    #[tokio::test]
    async fn edit_saved_swaps_the_stored_entry() {
        let dir = TempDir::new().unwrap();
        let gen =
            MockGenerator::with_prompts(PROMPTS4.to_vec()).with_refined("p1-edited", "Refined");
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        let id = c.results()[0].id;
        c.handle(AppCommand::Save(id)).await;

        c.handle(AppCommand::EditSaved {
            id,
            feedback: "rounder".into(),
        })
        .await;
        assert_eq!(c.screen(), Screen::Saved);
        assert_eq!(c.store().logos().len(), 1);
        assert_eq!(c.store().logos()[0].prompt, "p1-edited");
    }

    #[tokio::test]
    async fn reset_clears_results_and_error() {
        let dir = TempDir::new().unwrap();
        let gen = MockGenerator::with_prompts(PROMPTS4.to_vec())
            .failing_images(&["p1", "p2", "p3", "p4"]);
        let (mut c, _rx) = controller(&dir, gen);
        c.handle(AppCommand::SubmitAnswers(answers())).await;
        assert_eq!(c.screen(), Screen::Error);
        c.handle(AppCommand::Reset).await;
        assert_eq!(c.screen(), Screen::Welcome);
        assert!(c.results().is_empty());
        assert!(c.last_error().is_none());
    }
}
