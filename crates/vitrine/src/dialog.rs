//! Browser dialogs (alert, confirm, prompt) and how a session handled them.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Action taken on a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Accepted by an armed listener
    Accept,
    /// Dismissed because nobody was listening
    Dismiss,
    /// Not yet handled
    Pending,
}

/// A browser dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    dialog_type: DialogType,
    message: String,
    action: DialogAction,
}

impl Dialog {
    /// Create a new dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            action: DialogAction::Pending,
        }
    }

    /// Create an alert dialog
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogType::Alert, message)
    }

    /// Get dialog type
    #[must_use]
    pub fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Get dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get action taken
    #[must_use]
    pub fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Check if dialog was handled
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self.action, DialogAction::Pending)
    }

    /// Accept the dialog
    pub fn accept(&mut self) {
        self.action = DialogAction::Accept;
    }

    /// Dismiss the dialog
    pub fn dismiss(&mut self) {
        self.action = DialogAction::Dismiss;
    }
}

/// What happens to a dialog nobody armed a listener for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoDialogBehavior {
    /// Accept it
    AcceptAll,
    /// Dismiss it
    #[default]
    DismissAll,
}

impl AutoDialogBehavior {
    /// Apply the behaviour to an unobserved dialog
    pub fn apply(self, dialog: &mut Dialog) {
        match self {
            Self::AcceptAll => dialog.accept(),
            Self::DismissAll => dialog.dismiss(),
        }
    }
}

/// Shared history of dialogs a session has seen
#[derive(Clone, Default)]
pub struct DialogLog {
    dialogs: Arc<Mutex<Vec<Dialog>>>,
}

impl DialogLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handled dialog
    pub fn record(&self, dialog: Dialog) {
        if let Ok(mut dialogs) = self.dialogs.lock() {
            dialogs.push(dialog);
        }
    }

    /// Get all dialogs encountered
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Get count of dialogs
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogs.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether no dialog has been seen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get last dialog
    #[must_use]
    pub fn last(&self) -> Option<Dialog> {
        self.dialogs.lock().ok().and_then(|d| d.last().cloned())
    }

    /// Dialogs that were dismissed because no listener was armed
    #[must_use]
    pub fn missed(&self) -> Vec<Dialog> {
        self.dialogs()
            .into_iter()
            .filter(|d| d.action == DialogAction::Dismiss)
            .collect()
    }
}

impl std::fmt::Debug for DialogLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogLog")
            .field("dialog_count", &self.len())
            .finish()
    }
}
