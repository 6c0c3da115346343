//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::bus::Severity;
use crate::stream::StreamState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and metric values.
    pub highlight: Color,
    /// Color for warn-severity toasts and stale connections.
    pub warning: Color,
    /// Color for error-severity toasts and broken connections.
    pub error: Color,
    /// Color for success-severity toasts and a live connection.
    pub success: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for the header line.
    pub header: Style,
    /// Style for metric tile labels.
    pub label: Style,
    /// Style for never-observed metric values.
    pub unknown: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            unknown: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            unknown: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
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

    /// Get style for a toast severity
    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Default => Style::default().fg(self.highlight),
            Severity::Warn => Style::default().fg(self.warning),
            Severity::Success => Style::default().fg(self.success),
            Severity::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }

    /// Get style for the connection state indicator
    pub fn state_style(&self, state: StreamState) -> Style {
        match state {
            StreamState::Open => Style::default().fg(self.success),
            StreamState::Connecting => Style::default().fg(self.warning),
            StreamState::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
            StreamState::Closed => Style::default().fg(self.border).add_modifier(Modifier::DIM),
        }
    }
}
