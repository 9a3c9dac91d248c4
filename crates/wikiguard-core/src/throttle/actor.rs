//! Single-writer worker that owns the [`FailureLedger`].
//!
//! Every ledger access (delay computation, manual and periodic sweeps,
//! shutdown) is a command processed one at a time by one tokio task.
//! Callers hold a cloneable [`ThrottleHandle`] and wait for a `oneshot`
//! reply, so each call is a synchronous round trip.

use super::delay::{compute_delay, ThrottleConfig};
use super::ledger::FailureLedger;
use crate::error::{GuardError, GuardResult};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

enum Command {
    Delay {
        user: String,
        addr: String,
        successful: bool,
        reply: oneshot::Sender<Duration>,
    },
    CleanUp {
        reply: oneshot::Sender<usize>,
    },
    TrackedKeys {
        reply: oneshot::Sender<usize>,
    },
    ShutDown {
        reply: oneshot::Sender<()>,
    },
}

/// The worker side: owns the ledger and the command receiver.
pub struct ThrottleActor {
    config: ThrottleConfig,
    ledger: FailureLedger,
    commands: mpsc::Receiver<Command>,
}

impl ThrottleActor {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn(config: ThrottleConfig) -> GuardResult<ThrottleHandle> {
        config.validate()?;

        // Capacity 1 is the closest tokio gets to a rendezvous channel.
        let (tx, rx) = mpsc::channel(1);
        let actor = ThrottleActor {
            config,
            ledger: FailureLedger::new(),
            commands: rx,
        };
        tokio::spawn(actor.run());

        Ok(ThrottleHandle { commands: tx })
    }

    async fn run(mut self) {
        let period = self.config.sweep_interval();
        let mut sweep = tokio::time::interval_at(Instant::now() + period, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            delay_max_ms = self.config.delay_max.as_millis() as u64,
            sweep_secs = period.as_secs(),
            "throttle worker started"
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command).is_break() {
                            break;
                        }
                    }
                    // every handle was dropped
                    None => break,
                },
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }

        info!(tracked = self.ledger.len(), "throttle worker stopped");
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Delay {
                user,
                addr,
                successful,
                reply,
            } => {
                let delay = compute_delay(
                    &mut self.ledger,
                    &self.config,
                    &user,
                    &addr,
                    successful,
                    Instant::now(),
                );
                let _ = reply.send(delay);
                ControlFlow::Continue(())
            }
            Command::CleanUp { reply } => {
                let removed = self.sweep();
                let _ = reply.send(removed);
                ControlFlow::Continue(())
            }
            Command::TrackedKeys { reply } => {
                let _ = reply.send(self.ledger.len());
                ControlFlow::Continue(())
            }
            Command::ShutDown { reply } => {
                // Later sends fail immediately instead of queueing.
                self.commands.close();
                let _ = reply.send(());
                ControlFlow::Break(())
            }
        }
    }

    fn sweep(&mut self) -> usize {
        let removed = self.ledger.drop_stale(Instant::now(), self.config.drop_after);
        if removed > 0 {
            info!(removed, remaining = self.ledger.len(), "dropped stale failure records");
        } else {
            debug!(remaining = self.ledger.len(), "throttle sweep found nothing to drop");
        }
        removed
    }
}

/// Caller side of the throttle worker.
#[derive(Clone, Debug)]
pub struct ThrottleHandle {
    commands: mpsc::Sender<Command>,
}

impl ThrottleHandle {
    /// Report a login attempt and get the delay to impose before responding.
    ///
    /// Apply the delay to successful attempts too, otherwise response
    /// timing tells an attacker which guess was right.
    ///
    /// # Panics
    ///
    /// Panics when called after [`shut_down`](Self::shut_down). A login
    /// handler must never proceed without a delay, so there is no error to
    /// fall back on.
    pub async fn delay(&self, user: &str, addr: &str, successful: bool) -> Duration {
        let reply = self
            .request(|reply| Command::Delay {
                user: user.to_string(),
                addr: addr.to_string(),
                successful,
                reply,
            })
            .await;
        match reply {
            Ok(delay) => delay,
            Err(_) => used_after_shutdown(),
        }
    }

    /// Blocking variant of [`delay`](Self::delay) for plain OS threads.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async context, or after
    /// [`shut_down`](Self::shut_down).
    pub fn delay_blocking(&self, user: &str, addr: &str, successful: bool) -> Duration {
        let (tx, rx) = oneshot::channel();
        let command = Command::Delay {
            user: user.to_string(),
            addr: addr.to_string(),
            successful,
            reply: tx,
        };
        if self.commands.blocking_send(command).is_err() {
            used_after_shutdown();
        }
        match rx.blocking_recv() {
            Ok(delay) => delay,
            Err(_) => used_after_shutdown(),
        }
    }

    /// Drop every stale record now and return how many were removed.
    ///
    /// Returns only after the worker has processed the sweep, or
    /// [`GuardError::ThrottleStopped`] after shutdown.
    pub async fn clean_up(&self) -> GuardResult<usize> {
        self.request(|reply| Command::CleanUp { reply }).await
    }

    /// Number of keys currently tracked by the ledger.
    pub async fn tracked_keys(&self) -> GuardResult<usize> {
        self.request(|reply| Command::TrackedKeys { reply }).await
    }

    /// Stop the worker. Calling this more than once is a no-op.
    pub async fn shut_down(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::ShutDown { reply: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> GuardResult<T> {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(make(tx)).await.is_err() {
            return Err(stopped());
        }
        rx.await.map_err(|_| stopped())
    }
}

fn stopped() -> GuardError {
    error!("throttle used after shutdown");
    GuardError::ThrottleStopped
}

fn used_after_shutdown() -> ! {
    error!("login delay requested after throttle shutdown");
    panic!("throttle used after shutdown");
}
