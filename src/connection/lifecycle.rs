//! Host application lifecycle signals

use serde::{Deserialize, Serialize};

/// Foreground/background state reported by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    /// In the foreground and interactive
    Active,
    /// Transitioning, e.g. covered by a system dialog
    Inactive,
    Background,
}

impl AppLifecycle {
    #[must_use]
    pub fn is_foreground(self) -> bool {
        matches!(self, AppLifecycle::Active)
    }
}
