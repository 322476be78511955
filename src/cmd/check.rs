use anyhow::Result;
use serde::Serialize;

use reelhound::fingerprint::{host_of, is_target_url};
use reelhound::playback::is_media_url;
use reelhound::{Config, ContentFilter};

use super::output::print_json;
use crate::OutputFormat;

/// How the engine would treat a URL.
#[derive(Debug, Serialize)]
struct Classification<'a> {
    url: &'a str,
    host: Option<String>,
    blocked: bool,
    media: bool,
    video_host: bool,
    redirector: bool,
    excluded_embed: bool,
    target_site: bool,
}

/// Offline: runs the filter rules without touching the network.
pub fn cmd_check(config: &Config, url: &str, format: OutputFormat) -> Result<()> {
    let filter = ContentFilter::new(&config.filter);
    let result = Classification {
        url,
        host: host_of(url),
        blocked: filter.is_blocked(url),
        media: is_media_url(url),
        video_host: config.filter.is_video_host(url),
        redirector: config.filter.is_redirector(url),
        excluded_embed: config.filter.is_excluded_embed(url),
        target_site: is_target_url(&config.site, url),
    };

    if format == OutputFormat::Json {
        return print_json(&result);
    }
    println!("🔎 {url}");
    if let Some(host) = &result.host {
        println!("   Host: {host}");
    }
    println!("   {}", if result.blocked { "🚫 Blocked" } else { "✅ Allowed" });
    for (flag, label) in [
        (result.media, "Direct media"),
        (result.video_host, "Known video host"),
        (result.redirector, "Redirector (resolved before playback)"),
        (result.excluded_embed, "Excluded embed"),
        (result.target_site, "Scraped site (sends cookies and referer)"),
    ] {
        if flag {
            println!("   • {label}");
        }
    }
    Ok(())
}
