use anyhow::Result;
use serde::Serialize;

use reelhound::MediaItem;

use crate::OutputFormat;

/// Pretty-printed JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Listing entries, one per line in text mode.
pub fn print_items(items: &[MediaItem], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(items);
    }
    for item in items {
        print_item(item);
    }
    println!("\n({} items)", items.len());
    Ok(())
}

pub fn print_item(item: &MediaItem) {
    println!("[{}] {}", item.kind(), item.title);
    println!("   {}", item.page_link);
    if !item.description.is_empty() {
        println!("   {}", truncate_text(&item.description, 100));
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
