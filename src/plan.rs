use crate::{
    catalog::{PageCatalog, ScanReport},
    config::MpaConfig,
    error::Result,
    filter::ArgSources,
    input::{BuildInput, EntryTemplate},
    rewrite::{self, RewriteRule},
};
use serde::Serialize;
use tracing::{info, instrument};

/// Everything a bundler and dev server need for one invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MpaPlan {
    /// Discovered pages
    pub pages: PageCatalog,

    /// Bundler inputs
    pub input: BuildInput,

    /// Ordered history-fallback rules
    pub rewrites: Vec<RewriteRule>,

    /// URL of the first page
    pub first_page: Option<String>,

    /// Path the dev server should open
    pub open: Option<String>,

    /// Scan details
    #[serde(skip)]
    pub report: ScanReport,
}

impl MpaPlan {
    /// Returns the rule a request path resolves to, first match wins.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RewriteRule> {
        rewrite::resolve(&self.rewrites, path)
    }
}

/// Page discovery and rewrite generation for one project.
#[derive(Debug, Clone)]
pub struct Mpa {
    config: MpaConfig,
}

impl Mpa {
    /// Creates a planner for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: MpaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MpaConfig {
        &self.config
    }

    /// Scans the project and builds catalog, inputs and rewrites together.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan glob is invalid or the project root
    /// cannot be resolved.
    #[instrument(skip(self), fields(scan_dir = %self.config.scan_dir))]
    pub fn plan(&self, args: &ArgSources) -> Result<MpaPlan> {
        let (pages, report) = PageCatalog::build(&self.config, args)?;
        let input = self.input_for(&pages)?;
        let rewrites = rewrite::generate_rules(&pages, &self.config)?;

        let first_page = input.first_page(self.config.base.as_deref());
        let open = self.config.open.clone().or_else(|| first_page.clone());

        info!(
            "Planned {} pages, {} rewrite rules",
            pages.len(),
            rewrites.len()
        );

        Ok(MpaPlan {
            pages,
            input,
            rewrites,
            first_page,
            open,
            report,
        })
    }

    /// Scans the project and returns only the bundler inputs.
    ///
    /// # Errors
    ///
    /// See [`Mpa::plan`].
    pub fn build_input(&self, args: &ArgSources) -> Result<BuildInput> {
        let (pages, _) = PageCatalog::build(&self.config, args)?;
        self.input_for(&pages)
    }

    /// Scans the project and returns only the rewrite rules.
    ///
    /// # Errors
    ///
    /// See [`Mpa::plan`].
    pub fn rewrites(&self, args: &ArgSources) -> Result<Vec<RewriteRule>> {
        let (pages, _) = PageCatalog::build(&self.config, args)?;
        rewrite::generate_rules(&pages, &self.config)
    }

    fn input_for(&self, pages: &PageCatalog) -> Result<BuildInput> {
        let template = EntryTemplate::new(&self.config.scan_file, &self.config.filename)?;
        BuildInput::from_catalog(pages, &self.config.root, &template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn site() -> assert_fs::TempDir {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/pages/home/main.ts").write_str("").unwrap();
        temp.child("src/pages/home/index.html").write_str("").unwrap();
        temp.child("src/pages/shop/cart/main.ts").write_str("").unwrap();
        temp.child("src/pages/shop/cart/index.html").write_str("").unwrap();
        temp
    }

    #[test]
    fn test_plan_without_base() {
        let temp = site();
        let config = MpaConfig::builder().root(temp.path()).build().unwrap();
        let plan = Mpa::new(config).unwrap().plan(&ArgSources::new()).unwrap();

        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.input.len(), 2);
        assert_eq!(plan.first_page.as_deref(), Some("/home/index.html"));
        assert_eq!(plan.open, plan.first_page);
        // Root redirect plus four rules per page.
        assert_eq!(plan.rewrites.len(), 9);
        assert_eq!(
            plan.resolve("/shop/cart/checkout").map(|r| r.to.as_str()),
            Some("./src/pages/shop/cart/index.html")
        );
        assert_eq!(
            plan.resolve("/home.html").map(|r| r.to.as_str()),
            Some("./src/pages/home/index.html")
        );
    }

    #[test]
    fn test_plan_with_base() {
        let temp = site();
        let config = MpaConfig::builder()
            .root(temp.path())
            .base("app")
            .open("/app/shop/cart/")
            .build()
            .unwrap();
        let plan = Mpa::new(config).unwrap().plan(&ArgSources::new()).unwrap();

        assert_eq!(plan.first_page.as_deref(), Some("/app/home/index.html"));
        assert_eq!(plan.open.as_deref(), Some("/app/shop/cart/"));

        let home = "/app/src/pages/index/index.html";
        for path in ["/", "/app/", "/app"] {
            assert_eq!(plan.resolve(path).map(|r| r.to.as_str()), Some(home));
        }
        assert_eq!(
            plan.resolve("/app/home/index.html").map(|r| r.to.as_str()),
            Some("/app/src/pages/home/index.html")
        );
    }

    #[test]
    fn test_first_page_shares_rewrite_prefix() {
        let temp = site();
        let config = MpaConfig::builder()
            .root(temp.path())
            .base("//app//")
            .build()
            .unwrap();
        let plan = Mpa::new(config).unwrap().plan(&ArgSources::new()).unwrap();

        let prefix = "//app//";
        assert_eq!(plan.rewrites[0].to, format!("{prefix}src/pages/index/index.html"));
        assert_eq!(
            plan.first_page.as_deref(),
            Some(format!("{prefix}home/index.html").as_str())
        );
    }

    #[test]
    fn test_input_and_rewrites_match_plan() {
        let temp = site();
        let config = MpaConfig::builder().root(temp.path()).build().unwrap();
        let mpa = Mpa::new(config).unwrap();
        let args = ArgSources::new().entry("home");
        let plan = mpa.plan(&args).unwrap();

        assert_eq!(mpa.build_input(&args).unwrap(), plan.input);
        assert_eq!(mpa.rewrites(&args).unwrap(), plan.rewrites);
        assert_eq!(plan.input.len(), 1);
    }

    #[test]
    fn test_plan_serializes() {
        let temp = site();
        let config = MpaConfig::builder().root(temp.path()).build().unwrap();
        let plan = Mpa::new(config).unwrap().plan(&ArgSources::new()).unwrap();

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["firstPage"], "/home/index.html");
        assert_eq!(json["rewrites"][0]["from"], "^/$");
        assert!(json.get("report").is_none());
    }
}
