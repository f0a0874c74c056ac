//! Controller configuration.
//!
//! Two behaviours of the notes screen are policy rather than mechanics: when
//! the dialog closes relative to its mutation, and whether a failed delete
//! clears the loading flag. Both are carried here so front ends can load them
//! from their own config files.

use serde::{Deserialize, Serialize};

/// Name of the collection notes live in unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "Notes";

/// When a save or delete closes the dialog.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogClosePolicy {
    /// Close as soon as the request is issued, before its outcome is known.
    #[default]
    Immediate,
    /// Keep the dialog open and locked until the request settles.
    OnCompletion,
}

/// Behaviour switches for [`SyncController`](crate::SyncController).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    #[serde(default)]
    pub dialog_close: DialogClosePolicy,
    #[serde(default = "default_clear_loading_on_delete_failure")]
    pub clear_loading_on_delete_failure: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            dialog_close: DialogClosePolicy::default(),
            clear_loading_on_delete_failure: default_clear_loading_on_delete_failure(),
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub const fn with_dialog_close(mut self, policy: DialogClosePolicy) -> Self {
        self.dialog_close = policy;
        self
    }

    #[must_use]
    pub const fn with_clear_loading_on_delete_failure(mut self, clear: bool) -> Self {
        self.clear_loading_on_delete_failure = clear;
        self
    }
}

const fn default_clear_loading_on_delete_failure() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: ControllerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.dialog_close, DialogClosePolicy::Immediate);
        assert!(config.clear_loading_on_delete_failure);
    }

    #[test]
    fn parses_snake_case_policy() {
        let config: ControllerConfig = serde_json::from_str(
            r#"{ "dialog_close": "on_completion", "clear_loading_on_delete_failure": false }"#,
        )
        .unwrap();
        assert_eq!(config.dialog_close, DialogClosePolicy::OnCompletion);
        assert!(!config.clear_loading_on_delete_failure);
    }

    #[test]
    fn rejects_unknown_fields() {
        let error = serde_json::from_str::<ControllerConfig>(r#"{ "retry": true }"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }
}
