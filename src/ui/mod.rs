//! Terminal rendering using ratatui.
//!
//! - [`common`]: header bar, tab bar, status bar, help overlay
//! - [`fleet`]: sortable machine table
//! - [`vitals`]: per-sensor panels with range classification and trends
//! - [`predictions`]: risk-ordered failure prediction table
//! - [`detail`]: machine detail overlay
//! - [`theme`]: light/dark themes with terminal auto-detection

pub mod common;
pub mod detail;
pub mod fleet;
pub mod predictions;
pub mod theme;
pub mod vitals;

pub use theme::Theme;
