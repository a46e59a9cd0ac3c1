//! Completion action handling for a hosted run.

use perfsuite_core::{CompletionAction, PlatformControl, Result};
use std::thread;
use tracing::info;

/// Waits out the completion delay and reports the action.
///
/// A hosted run has no console to power off, so the action is announced and
/// the process then exits normally.
#[derive(Debug, Default)]
pub struct HostControl {
    executed: Option<CompletionAction>,
}

impl HostControl {
    /// Create a controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last executed action.
    pub fn executed(&self) -> Option<CompletionAction> {
        self.executed
    }
}

impl PlatformControl for HostControl {
    fn execute(&mut self, action: CompletionAction) -> Result<()> {
        let delay = action.delay();
        info!(action = %action, delay_ms = delay.as_millis() as u64, "Completion action pending");
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        info!(action = %action, "Completion action executed");
        self.executed = Some(action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_execute_records_action() {
        let mut control = HostControl::new();
        let action = CompletionAction::Reboot {
            delay: Duration::ZERO,
        };
        control.execute(action).unwrap();
        assert_eq!(control.executed(), Some(action));
    }
}
