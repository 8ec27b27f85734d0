//! History-fallback rewrite rules.
//!
//! A dev server applies these rules in list order and serves the target of
//! the first rule whose pattern matches the request path. Generated rules
//! map every page to its HTML template under several URL spellings
//! (`/shop/index.html`, `/shop.html`, `/shop`, `/shop/...`).
//!
//! Page names are matched literally. Rules are serialized as anchored regular
//! expressions with every page-name character escaped, so a page named
//! `c++` only matches `/c++`.

use crate::catalog::PageCatalog;
use crate::config::MpaConfig;
use crate::error::{Error, Result};
use crate::input::EntryTemplate;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// How a rule matches a request path.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// The path equals this string.
    Exact(String),
    /// The path starts with this string.
    Prefix(String),
    /// Caller-supplied regular expression.
    Regex(Regex),
}

impl RoutePattern {
    /// Matches exactly `path`.
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    /// Matches `prefix` and anything after it.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Compiles a caller-supplied regular expression.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))
    }

    /// Returns true if the request path matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact.as_str(),
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Regex(re) => re.is_match(path),
        }
    }

    /// Returns the pattern as an anchored regular expression.
    #[must_use]
    pub fn to_regex_string(&self) -> String {
        match self {
            Self::Exact(exact) => format!("^{}$", regex::escape(exact)),
            Self::Prefix(prefix) => format!("^{}", regex::escape(prefix)),
            Self::Regex(re) => re.as_str().to_string(),
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) | (Self::Prefix(a), Self::Prefix(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_regex_string())
    }
}

impl Serialize for RoutePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_regex_string())
    }
}

/// One `from → to` rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteRule {
    /// Request path pattern
    pub from: RoutePattern,
    /// Path served on match
    pub to: String,
}

impl RewriteRule {
    /// Creates a rule from a pattern and target.
    pub fn new(from: RoutePattern, to: impl Into<String>) -> Self {
        Self {
            from,
            to: to.into(),
        }
    }

    /// Creates a rule from a caller-supplied regular expression.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is not a valid regular expression.
    pub fn custom(from: &str, to: impl Into<String>) -> Result<Self> {
        Ok(Self::new(RoutePattern::regex(from)?, to))
    }

    /// Returns true if the rule applies to the request path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.from.matches(path)
    }
}

/// Orders page names so that more specific names come first.
///
/// If one name is a string prefix of the other, the longer one sorts first;
/// otherwise longer names sort first, then lexicographic order.
#[must_use]
pub fn page_order(a: &str, b: &str) -> Ordering {
    if a == b {
        Ordering::Equal
    } else if a.starts_with(b) {
        Ordering::Less
    } else if b.starts_with(a) {
        Ordering::Greater
    } else {
        b.len().cmp(&a.len()).then_with(|| a.cmp(b))
    }
}

/// Generates the ordered rewrite list for a catalog.
///
/// Seed rules from the config come first (copied, never modified), then the
/// root redirects, then four rules per page (eight with a base URL), with
/// nested pages ahead of the pages they extend.
///
/// # Errors
///
/// Returns an error if the scan file stem does not compile as a glob.
pub fn generate_rules(catalog: &PageCatalog, config: &MpaConfig) -> Result<Vec<RewriteRule>> {
    let template = EntryTemplate::new(&config.scan_file, &config.filename)?;
    let prefix = config.target_prefix();
    let base = config.base.as_deref();

    let mut rules = config.rewrites.clone();

    let home = format!("{prefix}{}/index/{}", config.scan_dir, config.filename);
    rules.push(RewriteRule::new(RoutePattern::exact("/"), &home));
    if let Some(base) = base {
        rules.push(RewriteRule::new(RoutePattern::exact(format!("/{base}/")), &home));
        rules.push(RewriteRule::new(RoutePattern::exact(format!("/{base}")), &home));
    }

    let mut names: Vec<&str> = catalog.names().collect();
    names.sort_by(|a, b| page_order(a, b));

    for name in names {
        let Some(page) = catalog.get(name) else {
            continue;
        };
        let to = format!("{prefix}{}", template.apply(&page.entry));

        push_page_rules(&mut rules, "", name, &to);
        if let Some(base) = base {
            push_page_rules(&mut rules, &format!("/{base}"), name, &to);
        }
    }

    debug!(
        "Generated {} rewrite rules ({} seed) for {} pages",
        rules.len(),
        config.rewrites.len(),
        catalog.len()
    );

    Ok(rules)
}

fn push_page_rules(rules: &mut Vec<RewriteRule>, mount: &str, page: &str, to: &str) {
    rules.push(RewriteRule::new(
        RoutePattern::exact(format!("{mount}/{page}/index.html")),
        to,
    ));
    rules.push(RewriteRule::new(
        RoutePattern::exact(format!("{mount}/{page}.html")),
        to,
    ));
    rules.push(RewriteRule::new(
        RoutePattern::exact(format!("{mount}/{page}")),
        to,
    ));
    rules.push(RewriteRule::new(
        RoutePattern::prefix(format!("{mount}/{page}/")),
        to,
    ));
}

/// Applies rules in order and returns the first match.
#[must_use]
pub fn resolve<'a>(rules: &'a [RewriteRule], path: &str) -> Option<&'a RewriteRule> {
    rules.iter().find(|rule| rule.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PageInfo;

    fn catalog(entries: &[(&str, &str)]) -> PageCatalog {
        let mut catalog = PageCatalog::default();
        for (name, entry) in entries {
            catalog.insert(
                (*name).to_string(),
                PageInfo {
                    entry: (*entry).to_string(),
                    filename: format!("{name}.html"),
                },
            );
        }
        catalog
    }

    fn shop_catalog() -> PageCatalog {
        catalog(&[
            ("shop", "src/pages/shop/main.ts"),
            ("shop/cart", "src/pages/shop/cart/main.ts"),
        ])
    }

    #[test]
    fn test_page_order() {
        let mut names = vec!["shop", "about", "shop/cart", "blog", "shopping"];
        names.sort_by(|a, b| page_order(a, b));
        assert_eq!(names, vec!["shop/cart", "shopping", "about", "blog", "shop"]);
    }

    #[test]
    fn test_nested_page_rules_first() {
        let config = MpaConfig::builder().build().unwrap();
        let rules = generate_rules(&shop_catalog(), &config).unwrap();

        // Root redirect, then four rules per page.
        assert_eq!(rules.len(), 9);
        assert_eq!(rules[0].from, RoutePattern::exact("/"));
        assert_eq!(rules[0].to, "./src/pages/index/index.html");

        let cart: Vec<_> = rules[1..5].iter().map(|r| r.from.clone()).collect();
        assert_eq!(
            cart,
            vec![
                RoutePattern::exact("/shop/cart/index.html"),
                RoutePattern::exact("/shop/cart.html"),
                RoutePattern::exact("/shop/cart"),
                RoutePattern::prefix("/shop/cart/"),
            ]
        );
        assert!(rules[1..5].iter().all(|r| r.to == "./src/pages/shop/cart/index.html"));
        assert!(rules[5..9].iter().all(|r| r.to == "./src/pages/shop/index.html"));
    }

    #[test]
    fn test_nested_path_resolves_to_specific_page() {
        let config = MpaConfig::builder().build().unwrap();
        let rules = generate_rules(&shop_catalog(), &config).unwrap();

        let hit = |path: &str| resolve(&rules, path).map(|r| r.to.as_str());
        assert_eq!(hit("/shop/cart/items"), Some("./src/pages/shop/cart/index.html"));
        assert_eq!(hit("/shop/checkout"), Some("./src/pages/shop/index.html"));
        assert_eq!(hit("/shop"), Some("./src/pages/shop/index.html"));
        assert_eq!(hit("/"), Some("./src/pages/index/index.html"));
        assert_eq!(hit("/unknown"), None);
    }

    #[test]
    fn test_base_url_rules() {
        let config = MpaConfig::builder().base("/app/").build().unwrap();
        let rules = generate_rules(&catalog(&[("home", "src/pages/home/main.ts")]), &config)
            .unwrap();

        let home = "/app/src/pages/index/index.html";
        assert_eq!(rules[0], RewriteRule::new(RoutePattern::exact("/"), home));
        assert_eq!(rules[1], RewriteRule::new(RoutePattern::exact("/app/"), home));
        assert_eq!(rules[2], RewriteRule::new(RoutePattern::exact("/app"), home));

        // Three root redirects plus eight page rules.
        assert_eq!(rules.len(), 11);
        assert!(rules[3..].iter().all(|r| r.to == "/app/src/pages/home/index.html"));
        assert_eq!(rules[7].from, RoutePattern::exact("/app/home/index.html"));
        assert_eq!(rules[10].from, RoutePattern::prefix("/app/home/"));
    }

    #[test]
    fn test_seed_rules_copied_first() {
        let config = MpaConfig::builder()
            .rewrite("^/api/.*$", "/api.html")
            .build()
            .unwrap();
        let rules = generate_rules(&PageCatalog::default(), &config).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].to, "/api.html");
        assert_eq!(config.rewrites.len(), 1);
        assert_eq!(resolve(&rules, "/api/users").unwrap().to, "/api.html");
    }

    #[test]
    fn test_empty_catalog_keeps_redirects() {
        let config = MpaConfig::builder().base("app").build().unwrap();
        let rules = generate_rules(&PageCatalog::default(), &config).unwrap();
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_special_characters_match_literally() {
        let config = MpaConfig::builder().build().unwrap();
        let rules =
            generate_rules(&catalog(&[("c++", "src/pages/c++/main.ts")]), &config).unwrap();

        assert!(resolve(&rules, "/c++").is_some());
        assert!(resolve(&rules, "/cc").is_none());
        assert!(resolve(&rules, "/c++Xhtml").is_none());
    }

    #[test]
    fn test_regex_serialization() {
        assert_eq!(
            RoutePattern::exact("/shop/index.html").to_regex_string(),
            r"^/shop/index\.html$"
        );
        assert_eq!(RoutePattern::prefix("/shop/").to_regex_string(), "^/shop/");

        let rule = RewriteRule::new(RoutePattern::exact("/a.html"), "./a.html");
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["from"], r"^/a\.html$");
        assert_eq!(json["to"], "./a.html");
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let err = RewriteRule::custom("^/legacy(", "/x.html").unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "^/legacy("),
            other => panic!("unexpected error: {other}"),
        }
    }
}
