use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

static STATIC_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:css|js|map|png|jpg|jpeg|gif|svg|ico|webp|ttf|woff|woff2)")
        .expect("invalid static asset regex")
});

/// Matches request paths against a list of route patterns.
///
/// Each pattern is a regular expression that must match the whole path, so
/// `/` matches only the root while `/s(.*)` matches everything starting with
/// `/s`.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    patterns: Vec<Regex>,
}

impl RouteMatcher {
    pub fn new<S: AsRef<str>>(routes: &[S]) -> Result<Self> {
        let patterns = routes
            .iter()
            .map(|route| {
                let route = route.as_ref();
                Regex::new(&format!("^(?:{route})$"))
                    .with_context(|| format!("Invalid route pattern '{route}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// Paths served by the API, which get status codes instead of redirects.
pub fn is_api_path(path: &str) -> bool {
    path.starts_with("/api") || path.starts_with("/trpc")
}

/// Whether the session guard runs for this path at all.
///
/// Framework internals and static assets are skipped, API paths never are.
pub fn in_scope(path: &str) -> bool {
    if is_api_path(path) {
        return true;
    }

    !(path.starts_with("/_next") || STATIC_ASSET.is_match(path))
}
