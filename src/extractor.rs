use crate::config::SelectorsConfig;
use crate::error::{BookLoaderError, Result};
use crate::models::CatalogRecord;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const UNKNOWN_AUTHOR: &str = "Unknown";

/// Turns one fetched catalog page into a `CatalogRecord`. Selectors come
/// from the site profile and are compiled once up front.
pub struct MetadataExtractor {
    base_url: Url,
    title: Selector,
    cover: Selector,
    book_file: Selector,
}

impl MetadataExtractor {
    pub fn new(base_url: &str, selectors: &SelectorsConfig) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            title: parse_selector(&selectors.title)?,
            cover: parse_selector(&selectors.cover)?,
            book_file: parse_selector(&selectors.book_file)?,
        })
    }

    pub fn extract(&self, book_id: u32, html: &str) -> Result<CatalogRecord> {
        let document = Html::parse_document(html);

        let heading = document
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| BookLoaderError::parse("title heading not found"))?;

        // The catalog renders "Title :: Author" in a single heading
        let mut parts = heading.splitn(2, "::");
        let title = parts.next().unwrap_or_default().trim().to_string();
        let author = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string();

        if title.is_empty() {
            return Err(BookLoaderError::parse("empty title heading"));
        }

        let cover_url = self.first_url(&document, &self.cover, "src");
        let file_url = self.first_url(&document, &self.book_file, "href");

        if cover_url.is_none() && file_url.is_none() {
            return Err(BookLoaderError::parse(
                "neither cover image nor book file link on page",
            ));
        }

        debug!(
            "book {}: title='{}' author='{}' cover={} file={}",
            book_id,
            title,
            author,
            cover_url.is_some(),
            file_url.is_some()
        );

        Ok(CatalogRecord {
            id: book_id,
            title,
            author,
            cover_url,
            file_url,
        })
    }

    fn first_url(&self, document: &Html, selector: &Selector, attr: &str) -> Option<Url> {
        document
            .select(selector)
            .filter_map(|el| el.value().attr(attr))
            .filter_map(|raw| self.base_url.join(raw).ok())
            .next()
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw)
        .map_err(|e| BookLoaderError::parse(format!("invalid selector '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MetadataExtractor {
        MetadataExtractor::new("https://tululu.org", &SelectorsConfig::default()).unwrap()
    }

    fn book_page(heading: &str) -> String {
        format!(
            "<html><body><div id=\"content\">\
             <h1>{}</h1>\
             <div class=\"bookimage\"><img src=\"/shots/239.jpg\"></div>\
             <a href=\"/txt.php?id=239\">download txt</a>\
             </div></body></html>",
            heading
        )
    }

    #[test]
    fn extracts_full_record_from_book_page() {
        let html = book_page("Sands of Mars\u{a0}::\u{a0}Arthur Clarke");
        let record = extractor().extract(239, &html).unwrap();

        assert_eq!(record.id, 239);
        assert_eq!(record.title, "Sands of Mars");
        assert_eq!(record.author, "Arthur Clarke");
        assert_eq!(
            record.cover_url.unwrap().as_str(),
            "https://tululu.org/shots/239.jpg"
        );
        assert_eq!(
            record.file_url.unwrap().as_str(),
            "https://tululu.org/txt.php?id=239"
        );
    }

    #[test]
    fn missing_author_falls_back_to_unknown() {
        let html = book_page("Sands of Mars");
        let record = extractor().extract(1, &html).unwrap();
        assert_eq!(record.author, "Unknown");
    }

    #[test]
    fn missing_title_heading_is_a_parse_failure() {
        let html = "<html><body><div id=\"content\"><p>empty entry</p></div></body></html>";
        let err = extractor().extract(1, html).unwrap_err();
        assert!(matches!(err, BookLoaderError::Parse(_)));
    }

    #[test]
    fn page_without_any_asset_is_a_parse_failure() {
        let html = "<html><body><div id=\"content\">\
                    <h1>Sands of Mars :: Arthur Clarke</h1>\
                    </div></body></html>";
        let err = extractor().extract(1, html).unwrap_err();
        assert!(matches!(err, BookLoaderError::Parse(_)));
    }

    #[test]
    fn relative_asset_urls_are_resolved_against_the_base() {
        let html = book_page("T :: A");
        let record = extractor().extract(1, &html).unwrap();
        assert!(record.cover_url.unwrap().as_str().starts_with("https://tululu.org/"));
    }

    #[test]
    fn invalid_selector_fails_construction() {
        let selectors = SelectorsConfig {
            title: ":::".to_string(),
            ..SelectorsConfig::default()
        };
        assert!(MetadataExtractor::new("https://tululu.org", &selectors).is_err());
    }
}
