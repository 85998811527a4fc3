//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use nvitals_core::report::ReportMode;

use crate::app::{can_add_fips_char, App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Acknowledgments block everything else, including the tutorial
    if matches!(app.state, AppState::Acknowledging) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_acknowledgment();
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.tutorial.is_open() {
        handle_tutorial_input(app, key);
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::EnteringFips) {
        handle_fips_input(app, key);
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('o') => {
            app.fips_input.clear();
            app.state = AppState::EnteringFips;
        }
        KeyCode::Char('t') => {
            app.tutorial.reopen();
        }
        _ => handle_report_input(app, key),
    }

    Ok(false)
}

fn handle_report_input(app: &mut App, key: KeyEvent) {
    let Some(mode) = app.report_mode() else {
        if key.code == KeyCode::Esc {
            app.state = AppState::ConfirmingQuit;
        }
        return;
    };

    match key.code {
        KeyCode::Enter | KeyCode::Char('f') => {
            app.status_message = None;
            app.toggle_report_mode();
        }
        KeyCode::Esc => match mode {
            ReportMode::Full => app.toggle_report_mode(),
            ReportMode::Summary => app.state = AppState::ConfirmingQuit,
        },
        KeyCode::Char('c') => app.copy_link(),
        KeyCode::Char('s') => {
            app.download_data();
        }
        _ => {}
    }
}

fn handle_tutorial_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Right | KeyCode::Enter | KeyCode::Char('n') => app.tutorial.next(),
        KeyCode::Left | KeyCode::Char('p') => app.tutorial.prev(),
        KeyCode::Char(' ') | KeyCode::Char('d') => {
            app.tutorial.toggle_dismiss_permanently();
        }
        KeyCode::Esc => app.tutorial.close(),
        _ => {}
    }
}

fn handle_fips_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_fips_input(),
        KeyCode::Esc => {
            app.fips_input.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.fips_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_fips_char(app.fips_input.len(), c) {
                app.fips_input.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use nvitals_core::models::CountyRecord;
    use nvitals_core::report::ReportView;
    use nvitals_core::store::{MemoryStore, Store};
    use nvitals_core::tutorial::{WizardState, TUTORIAL_SEEN_KEY};

    use crate::app::tests::{app_with_store, test_app};

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn with_report(mut app: App) -> App {
        app.report = Some(ReportView::new(
            "Autauga County",
            "01001",
            CountyRecord::default(),
            "2023",
        ));
        app
    }

    #[test]
    fn test_tutorial_keys_walk_and_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with_store(store.clone());
        assert!(app.tutorial.is_open());

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.tutorial.state(), WizardState::Open { index: 1 });

        // Space does nothing before the last step
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.tutorial.dismiss_permanently());

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.tutorial.dismiss_permanently());
        press(&mut app, KeyCode::Enter);

        assert!(!app.tutorial.is_open());
        assert_eq!(store.get(TUTORIAL_SEEN_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_tutorial_is_modal() {
        let mut app = with_report(app_with_store(Arc::new(MemoryStore::new())));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.report_mode(), Some(ReportMode::Summary));

        press(&mut app, KeyCode::Esc);
        assert!(!app.tutorial.is_open());
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_t_reopens_tutorial() {
        let mut app = test_app();
        assert!(!app.tutorial.is_open());
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.tutorial.state(), WizardState::Open { index: 0 });
    }

    #[test]
    fn test_report_mode_keys() {
        let mut app = with_report(test_app());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.report_mode(), Some(ReportMode::Full));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.report_mode(), Some(ReportMode::Summary));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::ConfirmingQuit);
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_fips_prompt_accepts_digits_only() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.state, AppState::EnteringFips);

        for c in ['1', 'x', '2', '3', '4', '5', '6'] {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.fips_input, "12345");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.fips_input, "1234");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.fips_input.is_empty());
    }

    #[test]
    fn test_acknowledgment_blocks_until_dismissed() {
        let mut app = with_report(test_app());
        app.acknowledge("Could not copy link".to_string());

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.report_mode(), Some(ReportMode::Summary));
        assert_eq!(app.state, AppState::Acknowledging);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.acknowledgment.is_none());
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::Normal);
    }
}
