//! `wikiguard throttle`: replay login attempts against a fresh throttle.
//!
//! Nothing sleeps; the command only prints the delay each attempt would
//! get, which makes it easy to try out step settings.

use anyhow::{Context, Result};
use serde::Serialize;
use wikiguard_core::ThrottleActor;

use crate::config::GuardConfig;

#[derive(Debug, Serialize)]
struct AttemptReport {
    attempt: u32,
    delay_ms: u64,
}

pub async fn run(
    config: &GuardConfig,
    user: &str,
    addr: &str,
    attempts: u32,
    success: bool,
    json: bool,
) -> Result<()> {
    let throttle = ThrottleActor::spawn(config.throttle).context("failed to start throttle")?;

    let mut reports = Vec::with_capacity(attempts as usize);
    for attempt in 1..=attempts {
        let delay = throttle.delay(user, addr, success).await;
        reports.push(AttemptReport {
            attempt,
            delay_ms: delay.as_millis() as u64,
        });
    }
    throttle.shut_down().await;

    if json {
        println!("{}", serde_json::to_string(&reports)?);
        return Ok(());
    }

    let outcome = if success { "successful" } else { "failed" };
    println!("{attempts} {outcome} attempt(s) as user={user} addr={addr}");
    for report in &reports {
        println!("  #{:<4} {:>8} ms", report.attempt, report.delay_ms);
    }
    Ok(())
}
