//! Benchmarks for the HTML extractors at varying page sizes.
//!
//! Run with: `cargo bench --bench extract_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reelhound::config::FilterConfig;
use reelhound::extract::{episodes, listing, servers};
use reelhound::ContentFilter;

const BASE: &str = "https://ww93.pencurimovie.bond/";

/// Listing grid with `count` entries wrapped in typical page chrome.
fn generate_listing(count: usize) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html><html><head><title>Movies</title></head><body>
<nav><ul><li><a href="/genre/action/">Action</a></li><li><a href="/year/2024/">2024</a></li></ul></nav>
<div class="movies-list">"#,
    );
    for i in 0..count {
        html.push_str(&format!(
            r#"<div class="ml-item"><a href="/movies/title-{i}/" class="ml-mask" oldtitle="Title {i}">
<span class="mli-quality">HD</span><img data-original="/posters/{i}.jpg" class="lazy">
<span class="mli-info"><h2>Title {i}</h2></span></a><p>Plot summary for entry {i}.</p></div>"#
        ));
    }
    html.push_str("</div><footer><p>&copy; Site</p></footer></body></html>");
    html
}

/// Series page with `seasons` seasons of ten episodes each.
fn generate_series(seasons: usize) -> String {
    let mut html = String::from("<html><body><h1>Long Show</h1><div id=\"seasons\">");
    for s in 1..=seasons {
        html.push_str(&format!(
            r#"<div class="tvseason"><div class="les-title"><strong>Season {s}</strong></div><div class="les-content">"#
        ));
        for e in 1..=10 {
            html.push_str(&format!(
                r#"<a href="/episode/long-show-{s}x{e:02}/">Episode {e}</a>"#
            ));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div></body></html>");
    html
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing_extract");

    for &count in &[10usize, 50, 200] {
        let html = generate_listing(count);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("ml_item", count), &html, |b, html| {
            b.iter(|| black_box(listing::extract(black_box(html), BASE).unwrap()));
        });
    }

    group.finish();
}

fn bench_episodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("episodes_extract");

    for &seasons in &[1usize, 5, 20] {
        let html = generate_series(seasons);
        group.bench_with_input(BenchmarkId::new("seasons", seasons), &html, |b, html| {
            b.iter(|| {
                black_box(episodes::extract(black_box(html), "https://ww93.pencurimovie.bond/series/long-show/").unwrap())
            });
        });
    }

    group.finish();
}

fn bench_embed_discovery(c: &mut Criterion) {
    let hosts = FilterConfig::default();
    let html = r#"<div class="movieplay">
        <div id="tab1"><iframe src="https://voe.sx/e/1"></iframe></div>
        <div id="tab2"><iframe data-src="https://dsvplay.com/e/2"></iframe></div>
        <div id="tab3"><iframe src="https://www.facebook.com/plugins/like.php"></iframe></div>
        <div id="tab4"><iframe src="//myvidplay.com/e/4"></iframe></div>
    </div>"#;

    c.bench_function("discover_embeds", |b| {
        b.iter(|| {
            black_box(
                servers::discover_embeds(black_box(html), "https://ww93.pencurimovie.bond/episode/x/", &hosts)
                    .unwrap(),
            )
        });
    });
}

fn bench_filter(c: &mut Criterion) {
    let filter = ContentFilter::default();
    let urls = [
        "https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js",
        "https://voe.sx/e/abc123",
        "https://cdn.jsdelivr.net/npm/hls.js@1",
        "https://www.googletagmanager.com/gtag/js?id=G-XYZ",
    ];

    c.bench_function("is_blocked_x4", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(filter.is_blocked(black_box(url)));
            }
        });
    });
}

criterion_group!(benches, bench_listing, bench_episodes, bench_embed_discovery, bench_filter);
criterion_main!(benches);
