use url::Url;

/// Slug fragments that never get a keyword. One entry longer than the
/// filter-stage exclusion list: `/about.htm` is only dropped here.
const EXCLUDED_SLUGS: &[&str] = &[
    "/about.htm",
    "/about-us.htm",
    "/market-area.htm",
    "/gallery.htm",
    "/video-gallery.htm",
    "/blog.htm",
    "/contact-us.htm",
    "/sitemap.htm",
];

/// Per-run derivation inputs, built once from the user's base URL and
/// "main keyword with location" template.
#[derive(Debug, Clone)]
pub struct KeywordRequest {
    pub homepage_url: String,
    pub main_keyword: String,
    pub location: String,
}

impl KeywordRequest {
    pub fn new(base_url: &str, main_keyword: &str) -> Self {
        let main_keyword = main_keyword.trim().to_string();
        let location = location_of(&main_keyword);
        Self {
            homepage_url: base_url.trim_end_matches('/').to_string(),
            main_keyword,
            location,
        }
    }
}

/// The location is everything after the last " in " of the template.
/// A template without " in " is its own location.
fn location_of(template: &str) -> String {
    match template.rsplit_once(" in ") {
        Some((_, loc)) => loc.to_string(),
        None => template.to_string(),
    }
}

/// Map a URL to its SEO keyword, or None when no keyword applies.
/// Pure function of its inputs; evaluated top to bottom, first match wins.
pub fn derive(url: &str, req: &KeywordRequest) -> Option<String> {
    let lower = url.to_lowercase();
    if EXCLUDED_SLUGS.iter().any(|slug| lower.contains(slug)) {
        return None;
    }

    if url.trim_end_matches('/') == req.homepage_url.trim_end_matches('/') {
        return Some(req.main_keyword.clone());
    }

    let parsed = Url::parse(url).ok()?;
    let path = parsed.path().trim_matches('/').to_string();
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        // /product-slug.htm → product page on the main site
        [slug] if slug.ends_with(".htm") => Some(format!(
            "{} Manufacturers in {}",
            slug_to_title(slug),
            req.location
        )),
        // /state/product-slug.htm → product page under a state
        [state, slug] if slug.ends_with(".htm") => Some(format!(
            "{} Manufacturers in {}",
            slug_to_title(slug),
            title_case(&state.replace('-', " "))
        )),
        // /state or /state/anything-else → base keyword rehomed to the state
        [state] | [state, _] => {
            let suffix = format!(" in {}", req.location);
            let base = req
                .main_keyword
                .strip_suffix(&suffix)
                .unwrap_or(&req.main_keyword)
                .trim();
            Some(format!(
                "{} in {}",
                base,
                title_case(&state.replace('-', " "))
            ))
        }
        _ => None,
    }
}

/// "stainless-steel-tanks.htm" → "Stainless Steel Tanks"
fn slug_to_title(slug: &str) -> String {
    let stripped = slug.strip_suffix(".htm").unwrap_or(slug);
    title_case(stripped.replace('-', " ").trim())
}

/// Title-case with Python str.title() semantics: uppercase a letter that
/// follows a non-letter, lowercase the rest, pass non-letters through.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ── Tests ──
