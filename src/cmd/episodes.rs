use anyhow::Result;

use reelhound::{Config, Resolver};

use super::output::print_json;
use crate::OutputFormat;

pub async fn cmd_episodes(config: Config, url: &str, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let seasons = resolver.resolve_episodes(url).await?;

    if format == OutputFormat::Json {
        return print_json(&seasons);
    }
    for season in &seasons {
        println!("📺 {} ({} episodes)", season.label, season.episodes.len());
        for episode in &season.episodes {
            println!("   {}  {}", episode.title, episode.page_link);
        }
        println!();
    }
    println!(
        "({} seasons, {} episodes)",
        seasons.len(),
        seasons.episode_count()
    );
    Ok(())
}
