use anyhow::Result;
use serde_json::json;

use reelhound::{Config, Resolver};

use super::output::{print_item, print_items, print_json};
use crate::OutputFormat;

pub async fn cmd_home(config: Config, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let home = resolver.home().await?;

    if format == OutputFormat::Json {
        return print_json(&home);
    }
    match &home.hero {
        Some(hero) => {
            println!("⭐ Featured");
            print_item(hero);
            println!();
        }
        None => println!("⚠️  Homepage has no entries"),
    }
    print_items(&home.items, format)
}

pub async fn cmd_list(config: Config, url: &str, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let items = resolver.resolve_listing(url).await?;
    print_items(&items, format)
}

pub async fn cmd_search(config: Config, query: &str, format: OutputFormat) -> Result<()> {
    let resolver = Resolver::new(config)?;
    let items = resolver.search(query).await?;

    if format == OutputFormat::Json {
        return print_json(&json!({ "query": query, "results": items }));
    }
    if items.is_empty() {
        println!("🔍 No results for '{query}'");
        return Ok(());
    }
    println!("🔍 Results for '{query}':\n");
    print_items(&items, format)
}
