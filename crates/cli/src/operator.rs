//! Console operator gate.

use perfsuite_core::{AutorunMode, OperatorGate, Result, StartDecision};
use std::fmt;
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Default wait before a countdown start.
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(5);

/// Source of one operator answer. `None` on the channel means end of input.
pub type LineSource = Box<dyn FnMut() -> mpsc::Receiver<Option<String>>>;

/// Asks the operator on stdin whether to start.
///
/// An empty line starts the run, `q` declines it. In countdown mode the run
/// starts on its own once the countdown expires. End of input counts as an
/// empty line in countdown mode and as a decline otherwise.
pub struct ConsoleGate {
    countdown: Duration,
    input: LineSource,
}

impl ConsoleGate {
    /// A gate reading stdin and waiting `countdown` in countdown mode.
    pub fn new(countdown: Duration) -> Self {
        Self::with_input(countdown, spawn_line_reader)
    }

    /// A gate reading answers from `input` instead of stdin.
    pub fn with_input<F>(countdown: Duration, input: F) -> Self
    where
        F: FnMut() -> mpsc::Receiver<Option<String>> + 'static,
    {
        Self {
            countdown,
            input: Box::new(input),
        }
    }
}

impl Default for ConsoleGate {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN)
    }
}

impl fmt::Debug for ConsoleGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleGate")
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}

impl OperatorGate for ConsoleGate {
    fn await_start(&mut self, mode: AutorunMode) -> Result<StartDecision> {
        match mode {
            AutorunMode::Immediate => Ok(StartDecision::Start),
            AutorunMode::Countdown => {
                eprintln!(
                    "Starting in {}s. Press Enter to start now, or type q to cancel.",
                    self.countdown.as_secs()
                );
                let answer = (self.input)();
                match answer.recv_timeout(self.countdown) {
                    Ok(Some(line)) => Ok(decision_for(&line)),
                    Ok(None) | Err(_) => Ok(StartDecision::Start),
                }
            }
            AutorunMode::Disabled => {
                eprintln!("Autorun disabled. Press Enter to start, or type q to quit.");
                info!("Waiting for operator");
                match (self.input)().recv() {
                    Ok(Some(line)) => Ok(decision_for(&line)),
                    Ok(None) | Err(_) => Ok(StartDecision::Decline),
                }
            }
        }
    }
}

/// Map one line of operator input to a decision.
pub fn decision_for(line: &str) -> StartDecision {
    if line.trim().eq_ignore_ascii_case("q") {
        StartDecision::Decline
    } else {
        StartDecision::Start
    }
}

/// Read one stdin line on a helper thread.
fn spawn_line_reader() -> mpsc::Receiver<Option<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line);
        let message = match read {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        };
        let _ = tx.send(message);
    });
    rx
}
