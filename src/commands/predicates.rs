//! Stock Predicates
//!
//! Ready-made preconditions for [`Leaf::predicate`](crate::commands::Leaf::predicate).
//! Each one inspects the message author and either passes the message on
//! unchanged or fails with a message meant for the user.

use crate::commands::{Check, Predicate};
use crate::message::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Fails unless the author holds `permission`.
pub fn require_permission(permission: impl Into<String>) -> Predicate {
    let permission = permission.into();
    Arc::new(move |message: Message| {
        if message.author().has_permission(&permission) {
            Check::Pass(message)
        } else {
            debug!(
                author = %message.author().id,
                permission = %permission,
                "Missing permission"
            );
            Check::Fail(format!(
                "You need the `{}` permission to use this command.",
                permission
            ))
        }
    })
}

/// Fails for bot authors.
pub fn deny_bots() -> Predicate {
    Arc::new(|message: Message| {
        if message.author().is_bot {
            Check::Fail("Bots cannot use this command.".to_string())
        } else {
            Check::Pass(message)
        }
    })
}

/// Per-author rate limit.
///
/// The first use by an author passes and starts their cooldown; uses within
/// `period` fail. Each author is tracked independently.
///
/// Expired entries are swept inside [`try_use`](Self::try_use) whenever the
/// map doubles past its size after the previous sweep, so the map stays
/// bounded by roughly twice the number of authors still cooling down.
#[derive(Debug)]
pub struct Cooldown {
    period: Duration,
    state: Mutex<CooldownState>,
}

#[derive(Debug)]
struct CooldownState {
    last_used: HashMap<String, Instant>,
    /// Map size that triggers the next sweep
    sweep_at: usize,
}

/// Smallest map size worth sweeping.
const MIN_SWEEP_AT: usize = 64;

impl CooldownState {
    fn sweep(&mut self, period: Duration, now: Instant) -> usize {
        let before = self.last_used.len();
        self.last_used
            .retain(|_, at| now.saturating_duration_since(*at) < period);
        self.sweep_at = (self.last_used.len() * 2).max(MIN_SWEEP_AT);
        before - self.last_used.len()
    }
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: Mutex::new(CooldownState {
                last_used: HashMap::new(),
                sweep_at: MIN_SWEEP_AT,
            }),
        }
    }

    /// Records a use at `now`, or returns the time left if still cooling down.
    pub fn try_use(&self, author_id: &str, now: Instant) -> Result<(), Duration> {
        let mut state = self.state.lock().unwrap();

        if let Some(&at) = state.last_used.get(author_id) {
            let elapsed = now.saturating_duration_since(at);
            if elapsed < self.period {
                return Err(self.period - elapsed);
            }
        } else if state.last_used.len() >= state.sweep_at {
            let removed = state.sweep(self.period, now);
            trace!(removed, remaining = state.last_used.len(), "Swept cooldowns");
        }

        state.last_used.insert(author_id.to_string(), now);
        Ok(())
    }

    /// Drops entries whose cooldown has already ended.
    pub fn purge(&self, now: Instant) -> usize {
        self.state.lock().unwrap().sweep(self.period, now)
    }

    /// Number of authors currently tracked, expired or not.
    pub fn tracked(&self) -> usize {
        self.state.lock().unwrap().last_used.len()
    }

    /// Wraps this cooldown as a predicate.
    pub fn into_predicate(self: Arc<Self>) -> Predicate {
        Arc::new(move |message: Message| {
            match self.try_use(&message.author().id, Instant::now()) {
                Ok(()) => Check::Pass(message),
                Err(remaining) => Check::Fail(format!(
                    "Slow down! Try again in {}s.",
                    remaining.as_secs_f64().ceil() as u64
                )),
            }
        })
    }
}
