use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

use crate::filter::{self, FilterConfig};
use crate::keyword::{self, KeywordRequest};
use crate::sitemap;

/// One line of the final report. `keyword` is None when keyword
/// generation is off for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub url: String,
    pub keyword: Option<String>,
}

/// Everything a single crawl needs besides the base URL. Built fresh per
/// run; nothing persists between runs.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub filters: FilterConfig,
    /// "Main keyword with location" template. Keyword generation runs iff
    /// this is present and non-blank.
    pub main_keyword: Option<String>,
}

/// Fetch, filter, derive. The only error paths are the base-URL validation
/// (before any network traffic) and client construction; fetch failures are
/// absorbed inside `sitemap::discover`, and an empty row set is `Ok`.
pub async fn run(
    base_url: &str,
    opts: &CrawlOptions,
    on_progress: impl FnMut(u32),
) -> Result<Vec<ResultRow>> {
    let base = validate_base_url(base_url)?;
    let client = sitemap::client()?;

    let urls = sitemap::discover(&client, &base, on_progress).await;
    let urls = filter::apply(urls, &opts.filters, base_url);
    info!("URLs after filtering: {}", urls.len());

    let main_keyword = opts
        .main_keyword
        .as_deref()
        .map(str::trim)
        .filter(|kw| !kw.is_empty());

    let rows = match main_keyword {
        Some(main_keyword) => {
            let req = KeywordRequest::new(base_url, main_keyword);
            urls.into_iter()
                .filter_map(|url| {
                    keyword::derive(&url, &req).map(|kw| ResultRow {
                        url,
                        keyword: Some(kw),
                    })
                })
                .collect()
        }
        None => urls
            .into_iter()
            .map(|url| ResultRow { url, keyword: None })
            .collect(),
    };

    Ok(rows)
}

fn validate_base_url(raw: &str) -> Result<Url> {
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        bail!("Base URL must start with http:// or https://");
    }
    Url::parse(raw).context("Base URL is not a valid URL")
}

// ── Tests ──
