//! Render Surface Seam
//!
//! The page abstraction the component renders into. Implementations own the
//! actual markup; the component only ever clears, mounts, and writes result
//! text through this trait.

use std::sync::Mutex;

/// Button outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonShape {
    Rect,
    Pill,
}

/// Stacking of funding-source buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonLayout {
    Vertical,
    Horizontal,
}

/// Color scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonColor {
    Accent,
    Gold,
    Blue,
}

/// Visual configuration of the payment button. The component always renders
/// the same fixed style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub shape: ButtonShape,
    pub layout: ButtonLayout,
    pub color: ButtonColor,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            shape: ButtonShape::Rect,
            layout: ButtonLayout::Vertical,
            color: ButtonColor::Accent,
        }
    }
}

/// Where the checkout UI lives.
pub trait Surface: Send + Sync {
    /// Add one button in the given style.
    fn mount_button(&self, style: ButtonStyle);

    /// Remove all button markup.
    fn clear_button(&self);

    /// Show a result or progress message to the user.
    fn show_message(&self, message: &str);

    /// Number of buttons currently mounted.
    fn mounted_buttons(&self) -> usize;
}

/// In-memory surface for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    buttons: Mutex<Vec<ButtonStyle>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message shown so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages().last().cloned()
    }
}

impl Surface for RecordingSurface {
    fn mount_button(&self, style: ButtonStyle) {
        self.buttons
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(style);
    }

    fn clear_button(&self) {
        self.buttons
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    fn show_message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(message.to_string());
    }

    fn mounted_buttons(&self) -> usize {
        self.buttons
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
