/// Slug fragments dropped from every crawl, regardless of configuration.
pub const EXCLUDED_SLUGS: &[&str] = &[
    "/market-area.htm",
    "/about-us.htm",
    "/gallery.htm",
    "/video-gallery.htm",
    "/blog.htm",
    "/contact-us.htm",
    "/sitemap.htm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Containing,
    NotContaining,
}

#[derive(Debug, Clone)]
pub struct CustomFilter {
    pub mode: FilterMode,
    pub keyword: String,
}

/// Which optional filters run, built fresh per crawl.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub remove_blogs: bool,
    pub only_mainsite: bool,
    pub location_pages_only: bool,
    pub custom: Option<CustomFilter>,
}

/// Run the filter chain. Steps apply in a fixed order, each on the output
/// of the previous; a disabled step passes its input through untouched.
/// Output is a subset of the input in the same relative order, except that
/// the main-site step may prepend the homepage.
pub fn apply(urls: Vec<String>, cfg: &FilterConfig, base_url: &str) -> Vec<String> {
    let mut urls = drop_excluded(urls);

    if cfg.remove_blogs {
        urls.retain(|url| !url.contains("/blog"));
    }

    if cfg.only_mainsite {
        urls = keep_mainsite(urls, base_url);
    }

    if cfg.location_pages_only {
        urls.retain(|url| is_location_page(url));
    }

    if let Some(custom) = &cfg.custom {
        let keyword = custom.keyword.trim().to_lowercase();
        if !keyword.is_empty() {
            urls.retain(|url| {
                let hit = url.to_lowercase().contains(&keyword);
                match custom.mode {
                    FilterMode::Containing => hit,
                    FilterMode::NotContaining => !hit,
                }
            });
        }
    }

    urls
}

/// Always-on exclusion of the fixed slug list, case-insensitive.
fn drop_excluded(mut urls: Vec<String>) -> Vec<String> {
    urls.retain(|url| {
        let lower = url.to_lowercase();
        EXCLUDED_SLUGS.iter().all(|slug| !lower.contains(slug))
    });
    urls
}

/// Keep only leaf pages: one path segment, ending in .htm. The homepage is
/// then prepended whenever it does not itself end in .htm, even when the
/// predicate rejected it or the sitemap never listed it.
fn keep_mainsite(urls: Vec<String>, base_url: &str) -> Vec<String> {
    let mut kept: Vec<String> = urls
        .into_iter()
        .filter(|url| {
            let path = leaf_path(url);
            !path.contains('/') && path.ends_with(".htm")
        })
        .collect();

    let homepage = base_url.trim_end_matches('/');
    if !homepage.ends_with(".htm") {
        kept.insert(0, homepage.to_string());
    }
    kept
}

/// Everything after the scheme separator and the first path slash.
/// A URL with no path yields its host, which then fails the .htm test.
fn leaf_path(url: &str) -> &str {
    let rest = url.splitn(2, "//").last().unwrap_or(url);
    rest.splitn(2, '/').last().unwrap_or(rest)
}

/// Exactly 3 slashes once trailing slashes are trimmed (scheme separators
/// included in the count), and the untrimmed URL keeps its trailing slash.
fn is_location_page(url: &str) -> bool {
    let trimmed = url.trim_end_matches('/');
    trimmed.matches('/').count() == 3 && url.ends_with('/')
}

// ── Tests ──
