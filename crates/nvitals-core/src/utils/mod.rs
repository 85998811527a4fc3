//! Utility functions for formatting values for display.

pub mod format;

pub use format::{
    age_display, format_income, format_margin, format_number, format_percent, format_population,
    format_thousands, truncate_string, NOT_AVAILABLE,
};
