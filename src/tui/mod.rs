mod clipboard;
mod screens;
mod state;

use crate::app::{self, AppCommand, AppController, AppEvent};
use crate::cli::{build_config, data_dir, Cli};
use crate::generate::GeminiClient;
use crate::model::Screen;
use crate::questionnaire::{Advance, Questionnaire};
use crate::storage::{self, SavedLogoStore};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    // A missing API key is fatal before any UI comes up.
    let client = GeminiClient::new(build_config(&args)).context("configure generation client")?;
    let store = SavedLogoStore::open(&data_dir(&args));

    // Unbounded channels: command and event volumes are tiny and backpressure
    // would only complicate the UI loop.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the
    // Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let controller = AppController::new(client, store, event_tx);
    let res = app::run_controller(controller, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<AppCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; the controller's events are the
    // sole source of shared state.
    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain controller events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(&args, &mut state, &cmd_tx, k) == KeyOutcome::Quit {
                    let _ = cmd_tx.send(AppCommand::Quit);
                    break Ok(());
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, ev: AppEvent) {
    match ev {
        AppEvent::Screen(screen) => {
            state.info.clear();
            match screen {
                Screen::Loading => state.loading_since = Instant::now(),
                Screen::Welcome => {
                    // A fresh run starts with a fresh questionnaire.
                    state.flow = Questionnaire::new(crate::model::default_questions());
                }
                Screen::Results | Screen::Saved => state.clamp_selection(),
                _ => {}
            }
            state.screen = screen;
        }
        AppEvent::Results(logos) => {
            state.results = logos;
            state.clamp_selection();
        }
        AppEvent::Saved(logos) => {
            state.saved = logos;
            state.clamp_selection();
        }
        AppEvent::Error(message) => state.error = message,
        AppEvent::Info(message) => state.info = message,
    }
}

#[derive(PartialEq)]
enum KeyOutcome {
    Continue,
    Quit,
}

fn handle_key(
    args: &Cli,
    state: &mut UiState,
    cmd_tx: &UnboundedSender<AppCommand>,
    k: KeyEvent,
) -> KeyOutcome {
    // Ctrl-C quits everywhere, including text-entry contexts where 'q' types.
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    if state.show_help {
        if matches!(k.code, KeyCode::Char('?') | KeyCode::Esc) {
            state.show_help = false;
        }
        return KeyOutcome::Continue;
    }

    if state.feedback_target.is_some() {
        handle_feedback_key(state, cmd_tx, k);
        return KeyOutcome::Continue;
    }

    match state.screen {
        Screen::Welcome => match k.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char('s') => {
                let _ = cmd_tx.send(AppCommand::StartDesigning);
            }
            KeyCode::Char('v') => {
                let _ = cmd_tx.send(AppCommand::ViewSaved);
            }
            KeyCode::Char('?') => state.show_help = true,
            _ => {}
        },
        Screen::Questionnaire => handle_questionnaire_key(state, cmd_tx, k),
        Screen::Loading => {
            // No cancellation: a running generation call is awaited to the end.
        }
        Screen::Results | Screen::Saved => return handle_gallery_key(args, state, cmd_tx, k),
        Screen::Error => match k.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Enter => {
                let _ = cmd_tx.send(AppCommand::AcknowledgeError);
            }
            KeyCode::Char('r') => {
                let _ = cmd_tx.send(AppCommand::Reset);
            }
            _ => {}
        },
    }
    KeyOutcome::Continue
}

fn handle_questionnaire_key(
    state: &mut UiState,
    cmd_tx: &UnboundedSender<AppCommand>,
    k: KeyEvent,
) {
    match k.code {
        KeyCode::Enter => match state.flow.advance() {
            Advance::Submitted(answers) => {
                let _ = cmd_tx.send(AppCommand::SubmitAnswers(answers));
            }
            Advance::Next => {}
        },
        KeyCode::Esc => {
            if state.flow.cursor() > 0 {
                state.flow.back();
            } else {
                let _ = cmd_tx.send(AppCommand::Reset);
            }
        }
        KeyCode::Backspace => {
            state.flow.input.pop();
        }
        KeyCode::Char(c) => state.flow.input.push(c),
        _ => {}
    }
}

fn handle_feedback_key(state: &mut UiState, cmd_tx: &UnboundedSender<AppCommand>, k: KeyEvent) {
    match k.code {
        KeyCode::Esc => state.cancel_feedback(),
        KeyCode::Enter => {
            // Whitespace-only feedback keeps the modal open.
            if let Some((id, feedback)) = state.take_feedback() {
                let cmd = match state.screen {
                    Screen::Saved => AppCommand::EditSaved { id, feedback },
                    _ => AppCommand::Refine { id, feedback },
                };
                let _ = cmd_tx.send(cmd);
            }
        }
        KeyCode::Backspace => {
            state.feedback.pop();
        }
        KeyCode::Char(c) => state.feedback.push(c),
        _ => {}
    }
}

fn handle_gallery_key(
    args: &Cli,
    state: &mut UiState,
    cmd_tx: &UnboundedSender<AppCommand>,
    k: KeyEvent,
) -> KeyOutcome {
    let on_saved = state.screen == Screen::Saved;
    match k.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Up | KeyCode::Char('k') => {
            if state.selected > 0 {
                state.selected -= 1;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.displayed().len() {
                state.selected += 1;
            }
        }
        KeyCode::Char('r') if !on_saved => state.open_feedback(),
        KeyCode::Char('e') if on_saved => state.open_feedback(),
        KeyCode::Char('s') if !on_saved => {
            if let Some(logo) = state.selected_logo() {
                let _ = cmd_tx.send(AppCommand::Save(logo.id));
                state.info = "Saved.".into();
            }
        }
        KeyCode::Char('x') if on_saved => {
            if let Some(logo) = state.selected_logo() {
                let _ = cmd_tx.send(AppCommand::Delete(logo.id));
            }
        }
        KeyCode::Char('d') => {
            if let Some(logo) = state.selected_logo() {
                match storage::write_png(logo, &args.out_dir) {
                    Ok(p) => state.info = format!("Downloaded: {}", p.display()),
                    Err(e) => state.info = format!("Download failed: {e:#}"),
                }
            }
        }
        KeyCode::Char('y') => {
            if let Some(logo) = state.selected_logo() {
                match clipboard::copy_to_clipboard(&logo.prompt) {
                    Ok(()) => state.info = "Prompt copied to clipboard.".into(),
                    Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                }
            }
        }
        KeyCode::Char('o') if !on_saved => {
            let _ = cmd_tx.send(AppCommand::Reset);
        }
        KeyCode::Char('b') if on_saved => {
            let _ = cmd_tx.send(AppCommand::Reset);
        }
        _ => {}
    }
    KeyOutcome::Continue
}

fn draw(area: ratatui::layout::Rect, f: &mut ratatui::Frame, state: &UiState) {
    match state.screen {
        Screen::Welcome => screens::draw_welcome(area, f),
        Screen::Questionnaire => screens::draw_questionnaire(area, f, state),
        Screen::Loading => screens::draw_loading(area, f, state),
        Screen::Results | Screen::Saved => screens::draw_gallery(area, f, state),
        Screen::Error => screens::draw_error(area, f, state),
    }

    if state.feedback_target.is_some() {
        screens::draw_feedback_modal(area, f, state);
    }
    if state.show_help {
        screens::draw_help(area, f);
    }
}
