//! `wikiguard resolve`: show where a URL path lands on disk.

use anyhow::Result;
use serde_json::json;

use crate::config::GuardConfig;

pub fn run(config: &GuardConfig, path: &str, json: bool) -> Result<()> {
    let resolver = super::resolver(config)?;
    let resolved = resolver.resolve(path)?;

    if json {
        let report = json!({
            "request": path,
            "resolved": resolved.as_path().display().to_string(),
            "index": resolved.is_index(),
            "exists": resolved.as_path().exists(),
        });
        println!("{report}");
    } else {
        println!("{resolved}");
    }
    Ok(())
}
