//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::model::{HealthState, MachineStatus, RiskBucket, SensorStatus};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level statuses.
    pub warning: Color,
    /// Color for critical-level statuses.
    pub critical: Color,
    /// Color for healthy statuses.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a machine health state
    pub fn health_style(&self, health: HealthState) -> Style {
        match health {
            HealthState::Excellent => {
                Style::default().fg(self.healthy).add_modifier(Modifier::BOLD)
            }
            HealthState::Good => Style::default().fg(self.healthy),
            HealthState::Warning => Style::default().fg(self.warning),
            HealthState::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Get style for a sensor classification
    pub fn sensor_style(&self, status: SensorStatus) -> Style {
        match status {
            SensorStatus::Normal => Style::default().fg(self.healthy),
            SensorStatus::Caution => Style::default().fg(self.warning),
            SensorStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Get style for a risk bucket
    pub fn risk_style(&self, bucket: RiskBucket) -> Style {
        match bucket {
            RiskBucket::Low => Style::default().fg(self.healthy),
            RiskBucket::Medium => Style::default().fg(self.warning),
            RiskBucket::High => Style::default().fg(self.warning).add_modifier(Modifier::BOLD),
            RiskBucket::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Get style for a machine's operational status
    pub fn machine_status_style(&self, status: MachineStatus) -> Style {
        match status {
            MachineStatus::Online => Style::default().fg(self.healthy),
            MachineStatus::Offline => Style::default().fg(self.critical),
            MachineStatus::Maintenance => Style::default().fg(self.warning),
        }
    }

    /// Get style for the live/fallback provenance tag
    pub fn provenance_style(&self, live: bool) -> Style {
        if live {
            Style::default().fg(self.healthy)
        } else {
            Style::default().fg(self.warning).add_modifier(Modifier::BOLD)
        }
    }
}
