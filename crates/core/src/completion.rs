// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! What happens to the host once a run finishes.

use crate::config::RuntimeSettings;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Action taken after a normal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CompletionAction {
    /// Power the host off after `delay`.
    Shutdown {
        /// Wait before acting.
        delay: Duration,
    },
    /// Restart the host after `delay`.
    Reboot {
        /// Wait before acting.
        delay: Duration,
    },
}

impl CompletionAction {
    /// Pick the action configured by `enable_shutdown_on_completion`.
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let delay = Duration::from_millis(u64::from(settings.reboot_or_shutdown_delay_ms));
        if settings.shutdown_on_completion {
            Self::Shutdown { delay }
        } else {
            Self::Reboot { delay }
        }
    }

    /// Wait before the action is carried out.
    pub fn delay(&self) -> Duration {
        match self {
            Self::Shutdown { delay } | Self::Reboot { delay } => *delay,
        }
    }

    /// The same action with a different delay.
    pub fn with_delay(self, delay: Duration) -> Self {
        match self {
            Self::Shutdown { .. } => Self::Shutdown { delay },
            Self::Reboot { .. } => Self::Reboot { delay },
        }
    }
}

impl fmt::Display for CompletionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown { .. } => f.write_str("shutdown"),
            Self::Reboot { .. } => f.write_str("reboot"),
        }
    }
}

/// Platform collaborator carrying out a [`CompletionAction`].
pub trait PlatformControl {
    /// Wait `action.delay()` and perform the action.
    fn execute(&mut self, action: CompletionAction) -> Result<()>;
}
