//! Per-command cooldown tracking (in-memory, lock-free).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Tracks the last invocation time of each command.
///
/// The key is the command name alone: a cooldown window is global across
/// every thread and user of the account, so one user invoking a command
/// blocks all other threads for the window.
#[derive(Clone)]
pub struct CooldownTracker {
    last_invoked: Arc<DashMap<String, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self {
            last_invoked: Arc::new(DashMap::new()),
        }
    }

    /// Check the window for `command` and, when clear, record the current
    /// instant in the same map operation.
    ///
    /// Recording happens before the handler runs, so overlapping invocations
    /// of a slow handler still enforce the window.
    ///
    /// Returns `Err(remaining_secs)` while the window is active.
    pub fn check_and_touch(&self, command: &str, count_down: Duration) -> Result<(), u64> {
        let now = Instant::now();
        match self.last_invoked.entry(command.to_string()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.duration_since(*entry.get());
                if elapsed < count_down {
                    let remaining = (count_down - elapsed).as_secs_f64().ceil() as u64;
                    return Err(remaining.max(1));
                }
                entry.insert(now);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Ok(())
            }
        }
    }

    /// Forget a command's window.
    #[allow(dead_code)]
    pub fn reset(&self, command: &str) {
        self.last_invoked.remove(command);
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}
