//! Ad/tracker filtering.
//!
//! The block decision is a lowercase host-substring test against a static
//! token set. Substring matching catches subdomains and tokens embedded in
//! longer hostnames, which is why the token list must be curated against the
//! video hosts the player actually needs.
//!
//! The CSS and script fragments are re-injected into every freshly loaded
//! document by the playback orchestrator.

use std::collections::BTreeSet;

use crate::config::FilterConfig;
use crate::fingerprint::host_of;

const SUPPRESSION_CSS: &str = "\
.ad-container, .ads, .advertisement, .banner-ads, \
div[id^='ad-'], div[class*='ad-'], div[id*='banner'], \
iframe[src*='ads'], iframe[src*='doubleclick'], \
div[style*='z-index: 2147483647'], div[style*='z-index: 9999999'], \
div[style*='position: fixed'][style*='width: 100%'][style*='height: 100%'], \
.jw-logo, .jw-title-primary, .jw-title-secondary, \
.vjs-big-play-button[style*='z-index'], \
#adb-enabled, .adb-modal, .detect-adblock, \
#loading, .loading, .popup, #ads, .watermark, .branding, .social-share, \
#checkresume_div_n \
{ display: none !important; opacity: 0 !important; pointer-events: none !important; \
height: 0 !important; width: 0 !important; }";

const DOM_COUNTERMEASURES: &str = "\
(function() {\
  if (window.__reelhoundArmed) { return; }\
  window.__reelhoundArmed = true;\
  window.open = function() { return null; };\
  function disarmLinks() {\
    var links = document.getElementsByTagName('a');\
    for (var i = 0; i < links.length; i++) { links[i].target = '_self'; }\
  }\
  disarmLinks();\
  setInterval(disarmLinks, 2000);\
  var iframes = document.getElementsByTagName('iframe');\
  for (var j = 0; j < iframes.length; j++) { iframes[j].removeAttribute('sandbox'); }\
})();";

/// Process-wide, read-only ad/tracker filter.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    tokens: BTreeSet<String>,
    video_hosts: Vec<String>,
}

impl ContentFilter {
    /// Build the filter from configuration. Tokens are lowercased once here.
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        let tokens = config
            .ad_hosts
            .iter()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let video_hosts = config
            .video_hosts
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        Self { tokens, video_hosts }
    }

    /// Whether a request to `url` should be refused.
    ///
    /// Accepts full URLs or bare hostnames; anything that doesn't parse as a
    /// URL is matched as a whole.
    #[must_use]
    pub fn is_blocked(&self, url: &str) -> bool {
        let host = host_of(url).unwrap_or_else(|| url.to_ascii_lowercase());
        self.is_blocked_host(&host)
    }

    fn is_blocked_host(&self, host: &str) -> bool {
        self.tokens.iter().any(|token| host.contains(token.as_str()))
    }

    /// Stylesheet hiding ad containers, anti-adblock banners and overlays.
    #[must_use]
    pub fn css_suppression_rules(&self) -> &'static str {
        SUPPRESSION_CSS
    }

    /// Script neutralizing popups, new-tab links and iframe sandboxing.
    #[must_use]
    pub fn dom_countermeasures(&self) -> &'static str {
        DOM_COUNTERMEASURES
    }

    /// Script that appends [`Self::css_suppression_rules`] as a `<style>`.
    #[must_use]
    pub fn style_injection_script(&self) -> String {
        inject_style_script(self.css_suppression_rules())
    }

    /// Whether the surface may navigate its top-level document to `url`.
    ///
    /// Navigation stays on the current candidate's host or a known video host;
    /// everything else is a click-hijack redirect.
    #[must_use]
    pub fn navigation_allowed(&self, url: &str, current_host: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        if self.is_blocked_host(&host) {
            return false;
        }
        let current_host = current_host.to_ascii_lowercase();
        (!current_host.is_empty() && host == current_host)
            || self.video_hosts.iter().any(|v| host.contains(v.as_str()))
    }

    /// Number of tokens loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

/// Wrap a CSS fragment into a script that appends it to the document head.
#[must_use]
pub fn inject_style_script(css: &str) -> String {
    let escaped = css.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "(function() {{ var s = document.createElement('style'); s.innerHTML = '{escaped}'; \
         (document.head || document.documentElement).appendChild(s); }})();"
    )
}
