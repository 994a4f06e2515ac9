//! URL utilities for link resolution and start-URL handling.

use scraper::{Html, Selector};
use url::Url;

pub fn convert_to_absolute_url(link: &str, base_url: &str) -> Result<String, String> {
    let base = Url::parse(base_url).map_err(|e| e.to_string())?;
    let absolute_url = base.join(link).map_err(|e| e.to_string())?;
    Ok(absolute_url.to_string())
}

/// Resolve a card link against the document base URI.
///
/// Empty hrefs and combinations that do not form a valid URL yield `None`,
/// which makes the card unusable rather than failing the page.
pub fn resolve_link(href: &str, base_uri: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    convert_to_absolute_url(href, base_uri)
        .ok()
        .filter(|resolved| !resolved.is_empty())
}

/// Base URI of a parsed document, as `document.baseURI` would report it.
///
/// The first `<base href>` wins when it resolves against the page URL.
pub fn document_base_uri(document: &Html, page_url: &str) -> String {
    let selector = match Selector::parse("base[href]") {
        Ok(selector) => selector,
        Err(_) => return page_url.to_string(),
    };

    document
        .select(&selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| convert_to_absolute_url(href.trim(), page_url).ok())
        .unwrap_or_else(|| page_url.to_string())
}

/// Filter URLs: HTTP(S) only, skip fragment-only links to the root.
pub fn should_crawl_url(url: &str) -> bool {
    let parsed_url = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return false;
    }

    if parsed_url.fragment().is_some()
        && parsed_url.path() == "/"
        && parsed_url.query().is_none()
    {
        return false;
    }

    true
}

/// Add https:// prefix for bare domains (CLI convenience).
///
/// Input that already carries a scheme is returned unchanged.
pub fn normalize_url_for_cli(url: &str) -> String {
    let trimmed = url.trim();

    match Url::parse(trimmed) {
        Err(url::ParseError::RelativeUrlWithoutBase) => format!("https://{}", trimmed),
        _ => trimmed.to_string(),
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.starts_with("text/html") || lower.starts_with("application/xhtml+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_absolute_url() {
        assert_eq!(
            convert_to_absolute_url("/page1", "https://test.local/foo").unwrap(),
            "https://test.local/page1"
        );
        assert_eq!(
            convert_to_absolute_url("page1", "https://test.local/foo/").unwrap(),
            "https://test.local/foo/page1"
        );
        assert_eq!(
            convert_to_absolute_url("https://other.local/page", "https://test.local").unwrap(),
            "https://other.local/page"
        );
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("/book/1", "https://example.com/catalogue/"),
            Some("https://example.com/book/1".to_string())
        );
        assert_eq!(
            resolve_link("a-light-in-the-attic_1000/index.html", "https://books.toscrape.com/catalogue/"),
            Some("https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html".to_string())
        );
        assert_eq!(resolve_link("", "https://example.com/"), None);
        assert_eq!(resolve_link("   ", "https://example.com/"), None);
        assert_eq!(resolve_link("/book/1", "not a base"), None);
    }

    #[test]
    fn test_document_base_uri_prefers_base_element() {
        let html = Html::parse_document(
            r#"<html><head><base href="/catalogue/"></head><body></body></html>"#,
        );
        assert_eq!(
            document_base_uri(&html, "https://books.toscrape.com/index.html"),
            "https://books.toscrape.com/catalogue/"
        );
    }

    #[test]
    fn test_document_base_uri_falls_back_to_page_url() {
        let html = Html::parse_document("<html><body><p>no base</p></body></html>");
        assert_eq!(
            document_base_uri(&html, "https://books.toscrape.com/"),
            "https://books.toscrape.com/"
        );
    }

    #[test]
    fn test_should_crawl_url() {
        assert!(should_crawl_url("https://test.local/page"));
        assert!(should_crawl_url("http://test.local/page"));
        assert!(!should_crawl_url("ftp://test.local/page"));
        assert!(!should_crawl_url("https://test.local/#section"));
        assert!(should_crawl_url("https://test.local/page#section"));
    }

    #[test]
    fn test_normalize_url_for_cli() {
        assert_eq!(normalize_url_for_cli("example.com"), "https://example.com");
        assert_eq!(
            normalize_url_for_cli(" https://example.com "),
            "https://example.com"
        );
        assert_eq!(normalize_url_for_cli("http://example.com"), "http://example.com");
        assert_eq!(
            normalize_url_for_cli("books.toscrape.com/catalogue/"),
            "https://books.toscrape.com/catalogue/"
        );
    }

    #[test]
    fn test_normalize_url_for_cli_keeps_foreign_schemes() {
        assert_eq!(normalize_url_for_cli("ftp://files.test/"), "ftp://files.test/");
        assert_eq!(normalize_url_for_cli("mailto:a@b.test"), "mailto:a@b.test");
        assert_eq!(normalize_url_for_cli("file:///etc/passwd"), "file:///etc/passwd");
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("image/png"));
    }
}
