use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use url::Url;

/// Probe sitemap1.xml .. sitemap{N}.xml after the root sitemap.
pub const MAX_SITEMAP_PROBES: usize = 50;
/// Stop probing after this many failed indices in a row.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 2;
/// Per-request timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// What a single probe produced. Only `Urls` resets the failure streak;
/// the other outcomes are interchangeable for control flow and kept
/// distinct for logging.
#[derive(Debug)]
enum ProbeOutcome {
    Urls(Vec<String>),
    Empty,
    HttpStatus(u16),
    NetworkError(String),
    ParseError(String),
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Discover every URL the site publishes through the conventional sitemap
/// pattern: `/sitemap.xml`, then `/sitemap1.xml` .. `/sitemap50.xml` in
/// order, stopping early after two consecutive failed indices.
///
/// Probing is strictly sequential; the failure streak depends on it.
/// `on_progress` receives the percentage of probe indices attempted.
/// Every failure is swallowed; an empty result is a valid outcome.
pub async fn discover(
    client: &reqwest::Client,
    base: &Url,
    mut on_progress: impl FnMut(u32),
) -> Vec<String> {
    let mut all_urls: BTreeSet<String> = BTreeSet::new();

    // Root sitemap first; failures here do not count toward the streak.
    if let Some(sitemap_url) = join(base, "/sitemap.xml") {
        match probe(client, &sitemap_url).await {
            ProbeOutcome::Urls(urls) => {
                debug!("{}: {} urls", sitemap_url, urls.len());
                all_urls.extend(urls);
            }
            outcome => debug!("{}: {:?}", sitemap_url, outcome),
        }
    }

    let mut consecutive_failures = 0u32;
    for i in 1..=MAX_SITEMAP_PROBES {
        let Some(sitemap_url) = join(base, &format!("/sitemap{}.xml", i)) else {
            break;
        };

        match probe(client, &sitemap_url).await {
            ProbeOutcome::Urls(urls) => {
                debug!("{}: {} urls", sitemap_url, urls.len());
                all_urls.extend(urls);
                consecutive_failures = 0;
            }
            ProbeOutcome::Empty => {
                debug!("{}: no urls", sitemap_url);
                consecutive_failures += 1;
            }
            ProbeOutcome::HttpStatus(code) => {
                debug!("{}: HTTP {}", sitemap_url, code);
                consecutive_failures += 1;
            }
            ProbeOutcome::NetworkError(e) => {
                warn!("{}: {}", sitemap_url, e);
                consecutive_failures += 1;
            }
            ProbeOutcome::ParseError(e) => {
                warn!("{}: malformed XML: {}", sitemap_url, e);
                consecutive_failures += 1;
            }
        }

        on_progress(((i * 100 / MAX_SITEMAP_PROBES) as u32).min(100));

        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            break;
        }
    }

    info!("Total URLs discovered: {}", all_urls.len());
    all_urls.into_iter().collect()
}

/// An absolute path join replaces whatever path the base carries,
/// so `https://ex.com/foo` still probes `https://ex.com/sitemap.xml`.
fn join(base: &Url, path: &str) -> Option<String> {
    base.join(path).ok().map(String::from)
}

/// Fetch one candidate sitemap and classify the result. A single index is
/// never retried; the caller moves on to the next one.
async fn probe(client: &reqwest::Client, url: &str) -> ProbeOutcome {
    let res = match client.get(url).send().await {
        Ok(res) => res,
        Err(e) => return ProbeOutcome::NetworkError(e.to_string()),
    };

    let status = res.status().as_u16();
    if status != 200 {
        return ProbeOutcome::HttpStatus(status);
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(e) => return ProbeOutcome::NetworkError(e.to_string()),
    };
    if !body.contains("<loc>") {
        return ProbeOutcome::Empty;
    }

    match parse_urlset(&body) {
        Ok(urls) if urls.is_empty() => ProbeOutcome::Empty,
        Ok(urls) => ProbeOutcome::Urls(urls),
        Err(e) => ProbeOutcome::ParseError(e.to_string()),
    }
}

/// Collect the text of every <loc> element, whatever its parent: urlset
/// entries and sitemap-index entries alike. Malformed XML discards the
/// whole document.
fn parse_urlset(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
            }
            quick_xml::events::Event::Text(e) if in_loc => {
                let text = e.unescape()?.trim().to_string();
                if !text.is_empty() {
                    urls.push(text);
                }
            }
            quick_xml::events::Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urlset(urls: &[&str]) -> String {
        let locs: String = urls
            .iter()
            .map(|u| format!("<url><loc>{}</loc></url>", u))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            locs
        )
    }

    async fn mount_sitemap(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn parse_collects_loc_text() {
        let xml = urlset(&["https://ex.com/a.htm", "https://ex.com/b.htm"]);
        let urls = parse_urlset(&xml).unwrap();
        assert_eq!(urls, vec!["https://ex.com/a.htm", "https://ex.com/b.htm"]);
    }

    #[test]
    fn parse_accepts_sitemap_index_entries() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sitemap><loc> https://ex.com/sitemap1.xml </loc></sitemap>
        </sitemapindex>"#;
        assert_eq!(parse_urlset(xml).unwrap(), vec!["https://ex.com/sitemap1.xml"]);
    }

    #[test]
    fn parse_skips_empty_loc() {
        let xml = "<urlset><url><loc>  </loc></url><url><loc>https://ex.com/x</loc></url></urlset>";
        assert_eq!(parse_urlset(xml).unwrap(), vec!["https://ex.com/x"]);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = "<urlset><url><loc>https://ex.com/a</bad></url></urlset>";
        assert!(parse_urlset(xml).is_err());
    }

    #[tokio::test]
    async fn discover_unions_root_and_indexed_sitemaps() {
        let server = MockServer::start().await;
        mount_sitemap(&server, "/sitemap.xml", urlset(&["https://ex.com/b.htm"])).await;
        mount_sitemap(&server, "/sitemap1.xml", urlset(&["https://ex.com/a.htm"])).await;
        mount_sitemap(
            &server,
            "/sitemap2.xml",
            urlset(&["https://ex.com/a.htm", "https://ex.com/c.htm"]),
        )
        .await;
        // sitemap3/4 404 by default → probing stops there

        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&client().unwrap(), &base, |_| {}).await;

        // Deduplicated and lexically sorted
        assert_eq!(
            urls,
            vec![
                "https://ex.com/a.htm",
                "https://ex.com/b.htm",
                "https://ex.com/c.htm",
            ]
        );
    }

    #[tokio::test]
    async fn two_consecutive_failures_stop_probing() {
        let server = MockServer::start().await;
        mount_sitemap(&server, "/sitemap1.xml", urlset(&["https://ex.com/1"])).await;
        mount_sitemap(&server, "/sitemap2.xml", urlset(&["https://ex.com/2"])).await;
        // 3 and 4 are not mounted → 404, 404
        Mock::given(method("GET"))
            .and(path("/sitemap5.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://ex.com/5"])))
            .expect(0)
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&client().unwrap(), &base, |_| {}).await;

        assert_eq!(urls, vec!["https://ex.com/1", "https://ex.com/2"]);
        // MockServer verifies the expect(0) on sitemap5.xml when dropped
    }

    #[tokio::test]
    async fn failure_streak_resets_on_success() {
        let server = MockServer::start().await;
        mount_sitemap(&server, "/sitemap1.xml", urlset(&["https://ex.com/1"])).await;
        // 2 fails, 3 succeeds, 4 and 5 fail → stop after 5
        mount_sitemap(&server, "/sitemap3.xml", urlset(&["https://ex.com/3"])).await;

        let base = Url::parse(&server.uri()).unwrap();
        let mut last_pct = 0;
        let urls = discover(&client().unwrap(), &base, |pct| last_pct = pct).await;

        assert_eq!(urls, vec!["https://ex.com/1", "https://ex.com/3"]);
        // 5 indices attempted out of 50
        assert_eq!(last_pct, 10);
    }

    #[tokio::test]
    async fn empty_sitemap_counts_as_failure() {
        let server = MockServer::start().await;
        // 200 responses that never yield a URL: one without <loc>, one
        // malformed. Two in a row end the probe loop.
        mount_sitemap(&server, "/sitemap1.xml", "<urlset></urlset>".into()).await;
        mount_sitemap(&server, "/sitemap2.xml", "<urlset><loc>x</bad></urlset>".into()).await;
        Mock::given(method("GET"))
            .and(path("/sitemap3.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://ex.com/3"])))
            .expect(0)
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&client().unwrap(), &base, |_| {}).await;
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn progress_reports_indices_attempted() {
        let server = MockServer::start().await;
        let base = Url::parse(&server.uri()).unwrap();

        let mut seen = Vec::new();
        let _ = discover(&client().unwrap(), &base, |pct| seen.push(pct)).await;

        // Nothing mounted: root swallowed, indices 1 and 2 fail, stop.
        assert_eq!(seen, vec![2, 4]);
    }
}
