//! First-run tutorial wizard.
//!
//! The wizard is a small state machine over a fixed list of steps. It opens on
//! mount unless the persisted "seen" flag is set, and sets that flag only when
//! the user ticks "Do not show tutorial again" on the last step and closes.

pub mod steps;
pub mod wizard;

pub use steps::{TutorialStep, TUTORIAL_STEPS};
pub use wizard::{TutorialWizard, WizardEvent, WizardState, TUTORIAL_SEEN_KEY};
