use anyhow::Result;

use reelhound::{Config, Resolver, ScrapeError};

use super::output::print_json;
use crate::OutputFormat;

pub async fn cmd_servers(config: Config, url: &str, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let candidates = match resolver.resolve_candidates(url).await {
        Ok(candidates) => candidates,
        Err(ScrapeError::NoCandidates { .. }) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if format == OutputFormat::Json {
        return print_json(&candidates);
    }
    if candidates.is_empty() {
        println!("❌ No video servers found on {url}");
        return Ok(());
    }
    println!("🎬 {} server candidates, in fallback order:\n", candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let host = candidate.host().unwrap_or_else(|| "?".to_string());
        println!("   {}. {host:<24} {candidate}", i + 1);
    }
    Ok(())
}
