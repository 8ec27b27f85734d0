use crate::{
    config::MpaConfig,
    entry::{EntryParser, ParsedEntry},
    error::Result,
    filter::{ArgSources, FilterSet},
    scanner::Scanner,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A page's source entry and generated HTML filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Entry file path relative to the project root
    pub entry: String,

    /// Output HTML path, e.g. `shop/cart.html`
    pub filename: String,
}

/// Pages keyed by page name, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageCatalog {
    pages: BTreeMap<String, PageInfo>,
}

/// Everything the catalog build saw, including excluded entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Glob the scan matched against
    pub glob: String,

    /// Effective filter argument string
    pub args: String,

    /// Resolved filter
    pub filters: FilterSet,

    /// Every parsed entry in discovery order, included or not
    pub all_entries: Vec<ParsedEntry>,
}

impl ScanReport {
    /// Entries kept by the filter.
    pub fn included(&self) -> impl Iterator<Item = &ParsedEntry> {
        self.all_entries.iter().filter(|e| e.include)
    }

    /// Entries dropped by the filter.
    pub fn excluded(&self) -> impl Iterator<Item = &ParsedEntry> {
        self.all_entries.iter().filter(|e| !e.include)
    }
}

impl PageCatalog {
    /// Scans the configured scan root and builds the catalog.
    ///
    /// A missing scan directory produces an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry glob does not compile.
    pub fn build(config: &MpaConfig, args: &ArgSources) -> Result<(Self, ScanReport)> {
        let scanner = Scanner::new(config)?;
        let (files, _stats) = scanner.scan();

        let filters = FilterSet::resolve(args, &config.default_entries);
        if !filters.is_empty() {
            debug!(
                "Filtering pages to: {}",
                filters.names().collect::<Vec<_>>().join(", ")
            );
        }

        let parser = EntryParser::new(&config.scan_dir);
        let all_entries: Vec<ParsedEntry> = files
            .iter()
            .map(|file| parser.parse(file, &filters))
            .collect();

        let catalog = Self::from_entries(&all_entries);

        debug!(
            "Catalog built: {} discovered, {} pages",
            all_entries.len(),
            catalog.len()
        );

        let report = ScanReport {
            glob: scanner.glob().to_string(),
            args: args.effective().to_string(),
            filters,
            all_entries,
        };

        Ok((catalog, report))
    }

    /// Builds a catalog from parsed entries, skipping excluded ones.
    ///
    /// Later entries with the same page name replace earlier ones.
    #[must_use]
    pub fn from_entries(entries: &[ParsedEntry]) -> Self {
        let mut catalog = Self::default();
        for entry in entries.iter().filter(|e| e.include) {
            catalog.insert(
                entry.page_name.clone(),
                PageInfo {
                    entry: entry.file.clone(),
                    filename: entry.filename(),
                },
            );
        }
        catalog
    }

    /// Inserts a page, replacing any page with the same name.
    pub fn insert(&mut self, name: String, page: PageInfo) {
        if let Some(previous) = self.pages.insert(name, page) {
            trace!("Replaced page entry {}", previous.entry);
        }
    }

    /// Returns the page with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PageInfo> {
        self.pages.get(name)
    }

    /// Returns the number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no pages were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates page names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Iterates pages in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageInfo)> {
        self.pages.iter().map(|(name, page)| (name.as_str(), page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn create_test_config(root: &Path) -> MpaConfig {
        MpaConfig::builder().root(root).build().unwrap()
    }

    fn site() -> assert_fs::TempDir {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/pages/home/main.ts").write_str("").unwrap();
        temp.child("src/pages/shop/cart/main.ts").write_str("").unwrap();
        temp
    }

    #[test]
    fn test_catalog_end_to_end() {
        let temp = site();
        let (catalog, report) =
            PageCatalog::build(&create_test_config(temp.path()), &ArgSources::new()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("home"),
            Some(&PageInfo {
                entry: "src/pages/home/main.ts".to_string(),
                filename: "home.html".to_string(),
            })
        );
        assert_eq!(
            catalog.get("shop/cart"),
            Some(&PageInfo {
                entry: "src/pages/shop/cart/main.ts".to_string(),
                filename: "shop/cart.html".to_string(),
            })
        );
        assert_eq!(report.glob, "src/pages/**/main.{js,ts,jsx,tsx}");
        assert_eq!(report.args, "");
        assert_eq!(report.included().count(), 2);
    }

    #[test]
    fn test_catalog_filtered() {
        let temp = site();
        let args = ArgSources::new().page("shop/cart");
        let (catalog, report) =
            PageCatalog::build(&create_test_config(temp.path()), &args).unwrap();

        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["shop/cart"]);
        assert_eq!(report.args, "shop/cart");
        assert_eq!(report.excluded().count(), 1);
        assert_eq!(report.all_entries.len(), 2);
    }

    #[test]
    fn test_default_entries_need_an_argument() {
        let temp = site();
        let config = MpaConfig::builder()
            .root(temp.path())
            .default_entries("home")
            .build()
            .unwrap();

        let (catalog, _) = PageCatalog::build(&config, &ArgSources::new()).unwrap();
        assert_eq!(catalog.len(), 2);

        let (catalog, _) =
            PageCatalog::build(&config, &ArgSources::new().entry("shop/cart")).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["home", "shop/cart"]);
    }

    #[test]
    fn test_missing_scan_dir_is_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        let (catalog, report) =
            PageCatalog::build(&create_test_config(temp.path()), &ArgSources::new()).unwrap();

        assert!(catalog.is_empty());
        assert!(report.all_entries.is_empty());
    }

    #[test]
    fn test_duplicate_page_last_wins() {
        let parser = EntryParser::new("src/pages");
        let filters = FilterSet::default();
        let entries = vec![
            parser.parse("src/pages/home/main.js", &filters),
            parser.parse("src/pages/home/main.ts", &filters),
        ];

        let catalog = PageCatalog::from_entries(&entries);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("home").unwrap().entry, "src/pages/home/main.ts");
    }

    #[test]
    fn test_serializes_as_map() {
        let temp = site();
        let (catalog, _) =
            PageCatalog::build(&create_test_config(temp.path()), &ArgSources::new()).unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["shop/cart"]["filename"], "shop/cart.html");
        assert_eq!(json["home"]["entry"], "src/pages/home/main.ts");
    }
}
