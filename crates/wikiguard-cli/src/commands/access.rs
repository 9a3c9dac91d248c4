//! `wikiguard access`: print the verdicts a caller would get.

use anyhow::Result;
use wikiguard_core::AccessRequest;

use crate::config::GuardConfig;

pub fn run(config: &GuardConfig, path: &str, authenticated: bool, json: bool) -> Result<()> {
    let evaluator = super::evaluator(config, authenticated)?;
    let verdicts = evaluator.verdicts(&AccessRequest::new(path))?;

    if json {
        println!("{}", serde_json::to_string(&verdicts)?);
        return Ok(());
    }

    let caller = if authenticated { "authenticated" } else { "anonymous" };
    println!("{path} ({caller})");
    println!("  read:   {}", yes_no(verdicts.read));
    println!("  write:  {}", yes_no(verdicts.write));
    println!("  delete: {}", yes_no(verdicts.delete));
    Ok(())
}

fn yes_no(granted: bool) -> &'static str {
    if granted {
        "granted"
    } else {
        "denied"
    }
}
