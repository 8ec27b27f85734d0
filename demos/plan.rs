//! Plans a multi-page app and prints its rewrite rules.
//!
//! Run from a project with pages under `src/pages`:
//! `cargo run --example plan -- home,shop/cart`

use mpa_pages::{ArgSources, Mpa, MpaConfig};

fn main() -> anyhow::Result<()> {
    let pages = std::env::args().nth(1).unwrap_or_default();

    let config = MpaConfig::builder()
        .root(".")
        .rewrite("^/api/.*$", "/api.html")
        .build()?;

    let plan = Mpa::new(config)?.plan(&ArgSources::new().page(pages))?;

    println!("Pages:");
    for (name, page) in plan.pages.iter() {
        println!("  {name:<20} {} -> {}", page.entry, page.filename);
    }

    println!("\nRewrites (first match wins):");
    for rule in &plan.rewrites {
        println!("  {:<40} {}", rule.from.to_string(), rule.to);
    }

    if let Some(first) = &plan.first_page {
        println!("\nFirst page: {first}");
    }

    Ok(())
}
