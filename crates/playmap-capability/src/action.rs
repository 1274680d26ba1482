//! Actions an execution context may attempt.

use std::fmt;

/// Represents an action that requires capability authorization.
pub trait Action: fmt::Debug + Send + Sync {
    /// Get the type of this action (e.g., "script:run", "navigate:top").
    fn action_type(&self) -> &str;

    /// Whether the action is the direct result of a user gesture.
    fn user_gesture(&self) -> bool {
        false
    }
}

/// Action type strings.
pub mod action_types {
    /// Run script.
    pub const RUN_SCRIPT: &str = "script:run";
    /// Submit a form.
    pub const SUBMIT_FORM: &str = "form:submit";
    /// Open a popup window.
    pub const OPEN_POPUP: &str = "popup:open";
    /// Start a download.
    pub const DOWNLOAD: &str = "download:start";
    /// Use same-origin storage.
    pub const SAME_ORIGIN_STORAGE: &str = "storage:same-origin";
    /// Navigate the top-level browsing context.
    pub const NAVIGATE_TOP: &str = "navigate:top";
}

/// The actions a sandboxed document can attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    /// Execute a script.
    RunScript,
    /// Submit a form.
    SubmitForm,
    /// Open a popup.
    OpenPopup,
    /// Start a download.
    Download,
    /// Read or write same-origin storage.
    AccessStorage,
    /// Navigate the top-level context.
    NavigateTop {
        /// Navigation target.
        url: String,
        /// Whether a user gesture triggered it.
        user_gesture: bool,
    },
}

impl Action for ContextAction {
    fn action_type(&self) -> &str {
        match self {
            ContextAction::RunScript => action_types::RUN_SCRIPT,
            ContextAction::SubmitForm => action_types::SUBMIT_FORM,
            ContextAction::OpenPopup => action_types::OPEN_POPUP,
            ContextAction::Download => action_types::DOWNLOAD,
            ContextAction::AccessStorage => action_types::SAME_ORIGIN_STORAGE,
            ContextAction::NavigateTop { .. } => action_types::NAVIGATE_TOP,
        }
    }

    fn user_gesture(&self) -> bool {
        matches!(
            self,
            ContextAction::NavigateTop {
                user_gesture: true,
                ..
            }
        )
    }
}
