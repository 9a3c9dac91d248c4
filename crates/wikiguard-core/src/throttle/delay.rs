//! Delay computation for login attempts.
//!
//! Each attempt is evaluated against three scopes (user, source address,
//! global). Every scope contributes `step * failures_so_far`, the largest
//! contribution wins, and the result is capped at `delay_max`.

use super::key::TrackingKey;
use super::ledger::FailureLedger;
use crate::error::{GuardError, GuardResult};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Immutable throttle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Upper bound for any returned delay.
    pub delay_max: Duration,
    /// Increment per failed attempt of the same user.
    pub user_step: Duration,
    /// Increment per failed attempt from the same source address.
    pub addr_step: Duration,
    /// Increment per failed attempt overall.
    pub global_step: Duration,
    /// Counters are forgotten this long after their last failure.
    pub drop_after: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::uniform(
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(60 * 60),
        )
    }
}

impl ThrottleConfig {
    /// Derive all three steps from one user step: the address step is a
    /// tenth of it, the global step a twentieth.
    pub fn uniform(delay_max: Duration, step: Duration, drop_after: Duration) -> Self {
        Self {
            delay_max,
            user_step: step,
            addr_step: step / 10,
            global_step: step / 20,
            drop_after,
        }
    }

    pub fn validate(&self) -> GuardResult<()> {
        if self.drop_after.is_zero() {
            return Err(GuardError::InvalidConfig(
                "drop_after must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Interval of the periodic sweep: `drop_after`, clamped to 1s..=60s.
    pub fn sweep_interval(&self) -> Duration {
        self.drop_after
            .clamp(Duration::from_secs(1), Duration::from_secs(60))
    }
}

/// Compute the delay for one attempt and update the ledger.
///
/// The delay is based on the counts *before* this attempt, so the first
/// failure costs nothing. Successful attempts consult the counters but
/// never change them.
pub fn compute_delay(
    ledger: &mut FailureLedger,
    config: &ThrottleConfig,
    user: &str,
    addr: &str,
    successful: bool,
    now: Instant,
) -> Duration {
    let user_delay = scope_delay(ledger, &TrackingKey::user(user), config.user_step, successful, now);
    let addr_delay = scope_delay(ledger, &TrackingKey::addr(addr), config.addr_step, successful, now);
    let global_delay = scope_delay(ledger, &TrackingKey::Global, config.global_step, successful, now);

    let delay = user_delay.max(addr_delay).max(global_delay).min(config.delay_max);
    debug!(
        user = %user,
        addr = %addr,
        successful,
        delay_ms = delay.as_millis() as u64,
        "computed login delay"
    );
    delay
}

fn scope_delay(
    ledger: &mut FailureLedger,
    key: &TrackingKey,
    step: Duration,
    successful: bool,
    now: Instant,
) -> Duration {
    let count = ledger.count(key);
    if !successful {
        ledger.record_failure(key, now);
    }
    step.saturating_mul(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ThrottleConfig {
        ThrottleConfig {
            delay_max: Duration::from_secs(10),
            user_step: Duration::from_secs(1),
            addr_step: Duration::from_millis(100),
            global_step: Duration::from_millis(50),
            drop_after: Duration::from_secs(60),
        }
    }

    #[test]
    fn uniform_derives_smaller_steps() {
        let cfg = ThrottleConfig::uniform(
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(60),
        );
        assert_eq!(cfg.addr_step, Duration::from_millis(100));
        assert_eq!(cfg.global_step, Duration::from_millis(50));
    }

    #[test]
    fn zero_drop_after_is_rejected() {
        let cfg = ThrottleConfig {
            drop_after: Duration::ZERO,
            ..config()
        };
        assert!(matches!(cfg.validate(), Err(GuardError::InvalidConfig(_))));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn sweep_interval_is_clamped() {
        let short = ThrottleConfig {
            drop_after: Duration::from_millis(10),
            ..config()
        };
        let long = ThrottleConfig {
            drop_after: Duration::from_secs(3600),
            ..config()
        };
        assert_eq!(short.sweep_interval(), Duration::from_secs(1));
        assert_eq!(long.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config().sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn repeated_failures_grow_by_user_step() {
        let mut ledger = FailureLedger::new();
        let cfg = config();
        let now = Instant::now();

        let delays: Vec<u64> = (0..11)
            .map(|_| compute_delay(&mut ledger, &cfg, "user", "ip", false, now).as_secs())
            .collect();

        assert_eq!(delays, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(
            compute_delay(&mut ledger, &cfg, "user", "ip", false, now),
            cfg.delay_max
        );
    }

    #[test]
    fn success_consults_but_does_not_count() {
        let mut ledger = FailureLedger::new();
        let cfg = config();
        let now = Instant::now();

        for _ in 0..3 {
            compute_delay(&mut ledger, &cfg, "user", "ip", false, now);
        }
        let first = compute_delay(&mut ledger, &cfg, "user", "ip", true, now);
        let second = compute_delay(&mut ledger, &cfg, "user", "ip", true, now);

        assert_eq!(first, Duration::from_secs(3));
        assert_eq!(second, Duration::from_secs(3));
        assert_eq!(ledger.count(&TrackingKey::user("user")), 3);
    }

    #[test]
    fn fresh_users_on_one_address_follow_address_step() {
        let mut ledger = FailureLedger::new();
        let cfg = config();
        let now = Instant::now();

        let mut last = Duration::ZERO;
        for n in 0..10 {
            last = compute_delay(&mut ledger, &cfg, &format!("user{n}"), "ip", false, now);
        }
        assert_eq!(last, Duration::from_millis(900));
    }

    #[test]
    fn distinct_users_and_addresses_follow_global_step() {
        let mut ledger = FailureLedger::new();
        let cfg = config();
        let now = Instant::now();

        let mut last = Duration::ZERO;
        for n in 0..11 {
            last = compute_delay(
                &mut ledger,
                &cfg,
                &format!("user{n}"),
                &format!("ip{n}"),
                false,
                now,
            );
        }
        assert_eq!(last, Duration::from_millis(500));
    }

    #[test]
    fn rotating_addresses_do_not_help_one_user() {
        let mut ledger = FailureLedger::new();
        let cfg = config();
        let now = Instant::now();

        let mut last = Duration::ZERO;
        for n in 0..=10 {
            last = compute_delay(&mut ledger, &cfg, "user", &format!("ip{n}"), false, now);
        }
        assert_eq!(last, cfg.delay_max);
    }
}
