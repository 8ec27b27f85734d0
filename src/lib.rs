//! # mpa-pages
//!
//! Page discovery for multi-page web applications.
//!
//! ## Features
//!
//! - Entry discovery by glob (`src/pages/**/main.{js,ts,jsx,tsx}`)
//! - Nested page names (`src/pages/shop/cart/main.ts` is page `shop/cart`)
//! - Page filtering from `--entry`/`--file`/`--page` style overrides
//! - Bundler input maps with absolute template paths
//! - Ordered history-fallback rewrite rules with base URL support
//!
//! ## Quick Start
//!
//! ```no_run
//! use mpa_pages::{ArgSources, Mpa, MpaConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = MpaConfig::builder()
//!     .root(".")
//!     .scan_dir("src/pages")
//!     .base("/app/")
//!     .build()?;
//!
//! let plan = Mpa::new(config)?.plan(&ArgSources::new().page("home"))?;
//! for rule in &plan.rewrites {
//!     println!("{} -> {}", rule.from, rule.to);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows one way:
//! 1. **Scanner**: finds entry files under the scan root
//! 2. **Entry parser**: derives page names and output filenames
//! 3. **Filter**: keeps the requested pages
//! 4. **Catalog**: page name to entry and HTML filename
//! 5. **Input / Rewrite**: bundler inputs and dev-server rewrite rules

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod catalog;
mod config;
mod entry;
mod error;
mod filter;
mod input;
mod plan;
mod scanner;

pub mod rewrite;

pub use catalog::{PageCatalog, PageInfo, ScanReport};
pub use config::{
    normalize_base, FileConfig, MpaConfig, MpaConfigBuilder, SeedRewrite, DEFAULT_CONFIG_FILE,
};
pub use entry::{output_filename, EntryParser, ParsedEntry};
pub use error::{Error, Result};
pub use filter::{ArgSources, FilterSet};
pub use input::{BuildInput, EntryTemplate};
pub use plan::{Mpa, MpaPlan};
pub use rewrite::{RewriteRule, RoutePattern};

/// Scans the project and builds the full plan.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The project root cannot be resolved to an absolute path
///
/// # Examples
///
/// ```no_run
/// use mpa_pages::{plan, ArgSources, MpaConfig};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = MpaConfig::builder().build()?;
/// let plan = plan(config, &ArgSources::new())?;
/// println!("{:?}", plan.first_page);
/// # Ok(())
/// # }
/// ```
pub fn plan(config: MpaConfig, args: &ArgSources) -> Result<MpaPlan> {
    Mpa::new(config)?.plan(args)
}
