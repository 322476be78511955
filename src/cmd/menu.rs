use anyhow::Result;

use reelhound::{CategoryLink, Config, Resolver};

use super::output::print_json;
use crate::OutputFormat;

pub async fn cmd_menu(config: Config, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let menu = resolver.menu().await?;

    if format == OutputFormat::Json {
        return print_json(&menu);
    }
    print_section("🎭 Genres", &menu.genres);
    println!();
    print_section("📅 Release years", &menu.years);
    Ok(())
}

fn print_section(heading: &str, links: &[CategoryLink]) {
    println!("{heading} ({})", links.len());
    for link in links {
        println!("   {:<20} {}", link.name, link.url);
    }
}
