use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::Store;

use super::steps::TutorialStep;

/// Store key of the persisted "tutorial seen" flag.
pub const TUTORIAL_SEEN_KEY: &str = "nvitals_tutorial_seen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Closed,
    Open { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    Next,
    Prev,
    Close,
}

impl WizardState {
    /// Pure step transition over `step_count` steps.
    pub fn transition(self, event: WizardEvent, step_count: usize) -> Self {
        match (self, event) {
            (WizardState::Closed, _) => WizardState::Closed,
            (WizardState::Open { .. }, WizardEvent::Close) => WizardState::Closed,
            (WizardState::Open { index }, WizardEvent::Next) => {
                if index + 1 < step_count {
                    WizardState::Open { index: index + 1 }
                } else {
                    WizardState::Closed
                }
            }
            (WizardState::Open { index }, WizardEvent::Prev) => WizardState::Open {
                index: index.saturating_sub(1),
            },
        }
    }
}

/// First-run tutorial, shown on mount unless the user dismissed it for good.
pub struct TutorialWizard {
    store: Arc<dyn Store>,
    steps: &'static [TutorialStep],
    state: WizardState,
    dismiss_permanently: bool,
}

impl TutorialWizard {
    pub fn mount(store: Arc<dyn Store>, steps: &'static [TutorialStep]) -> Self {
        let seen = match store.get(TUTORIAL_SEEN_KEY) {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read tutorial flag, showing tutorial");
                false
            }
        };

        let state = if seen || steps.is_empty() {
            WizardState::Closed
        } else {
            WizardState::Open { index: 0 }
        };
        debug!(seen, ?state, "Tutorial mounted");

        Self {
            store,
            steps,
            state,
            dismiss_permanently: false,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, WizardState::Open { .. })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WizardState::Open { index } => Some(index),
            WizardState::Closed => None,
        }
    }

    pub fn current_step(&self) -> Option<&TutorialStep> {
        self.current_index().and_then(|i| self.steps.get(i))
    }

    pub fn is_first_step(&self) -> bool {
        self.current_index() == Some(0)
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index() == Some(self.steps.len().saturating_sub(1)) && self.is_open()
    }

    /// "Step 2 of 4"
    pub fn progress_label(&self) -> String {
        match self.current_index() {
            Some(i) => format!("Step {} of {}", i + 1, self.steps.len()),
            None => String::new(),
        }
    }

    pub fn next_label(&self) -> &'static str {
        if self.is_last_step() {
            "Get Started"
        } else {
            "Next"
        }
    }

    pub fn dismiss_permanently(&self) -> bool {
        self.dismiss_permanently
    }

    /// Set the "do not show again" choice. Only honoured on the last step.
    pub fn set_dismiss_permanently(&mut self, value: bool) -> bool {
        if !self.is_last_step() {
            return false;
        }
        self.dismiss_permanently = value;
        true
    }

    pub fn toggle_dismiss_permanently(&mut self) -> bool {
        let value = !self.dismiss_permanently;
        self.set_dismiss_permanently(value)
    }

    pub fn next(&mut self) {
        self.handle(WizardEvent::Next);
    }

    pub fn prev(&mut self) {
        self.handle(WizardEvent::Prev);
    }

    pub fn close(&mut self) {
        self.handle(WizardEvent::Close);
    }

    /// Open again from the first step, regardless of the persisted flag.
    pub fn reopen(&mut self) {
        if self.steps.is_empty() {
            return;
        }
        self.dismiss_permanently = false;
        self.state = WizardState::Open { index: 0 };
    }

    fn handle(&mut self, event: WizardEvent) {
        let was_open = self.is_open();
        self.state = self.state.transition(event, self.steps.len());

        if was_open && self.state == WizardState::Closed {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.dismiss_permanently {
            match self.store.set(TUTORIAL_SEEN_KEY, "true") {
                Ok(()) => debug!("Tutorial dismissed permanently"),
                Err(e) => warn!(error = %e, "Failed to persist tutorial flag"),
            }
        }
        self.dismiss_permanently = false;
    }
}
