//! Legacy shop scraper.
//!
//! Walks the paginated WooCommerce listing at singaporejews.com and pulls
//! out product name, image URL and product URL. The theme lazy-loads
//! images, so `data-src` wins over `src`, and placeholder images are
//! dropped.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use super::PipelineError;

const BASE_URL: &str = "https://singaporejews.com/shop/products/";
const PRODUCTS_PER_PAGE: u32 = 16;
const REQUEST_DELAY: Duration = Duration::from_millis(500);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

// Last-resort page count when the result counter is missing from the markup.
const FALLBACK_TOTAL_PAGES: u32 = 62;

/// One product pulled off a listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    pub name: String,
    pub image_url: String,
    pub product_url: String,
}

/// Scrape phase output.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutput {
    pub products: Vec<ScrapedProduct>,
    pub scraped_at: String,
    pub total_pages: u32,
    pub total_products: usize,
}

fn selector(css: &str) -> Selector {
    // All selectors in this module are literals.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e}"))
}

/// Strip WordPress CDN resize parameters, keeping only `ssl`.
///
/// `https://i0.wp.com/.../image.jpg?resize=450%2C450&ssl=1` becomes
/// `https://i0.wp.com/.../image.jpg?ssl=1`.
fn full_quality_image_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    let ssl = parsed
        .query_pairs()
        .find(|(key, _)| key == "ssl")
        .map(|(_, value)| value.into_owned());
    parsed.set_query(None);
    if let Some(ssl) = ssl {
        parsed.query_pairs_mut().append_pair("ssl", &ssl);
    }
    parsed.to_string()
}

/// Pick the real image URL out of a product `<img>` element.
fn image_url(img: ElementRef<'_>) -> Option<String> {
    let candidate = match img.value().attr("data-src") {
        Some(data_src) if !data_src.is_empty() => data_src.to_string(),
        _ => {
            let src = img.value().attr("src").unwrap_or_default();
            if src.starts_with("data:") {
                return None;
            }
            src.to_string()
        }
    };
    if candidate.is_empty() || candidate.contains("placeholder") {
        return None;
    }
    Some(full_quality_image_url(&candidate))
}

/// Parse all products out of one listing page.
fn parse_page(html: &str) -> Vec<ScrapedProduct> {
    let document = Html::parse_document(html);
    let title_sel = selector("h3.woocommerce-loop-product__title");
    let link_sel = selector("a");
    let thumb_sel = selector("img.attachment-woocommerce_thumbnail");
    let img_sel = selector("img");

    let mut products = Vec::new();
    for title in document.select(&title_sel) {
        let Some(link) = title.select(&link_sel).next() else {
            continue;
        };
        let name = link.text().collect::<String>().trim().to_string();
        let product_url = link.value().attr("href").unwrap_or_default().to_string();

        // Walk up to the product container to find the thumbnail.
        let container = title
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| {
                el.value().name() == "li"
                    && el
                        .value()
                        .attr("class")
                        .is_some_and(|class| class.contains("type-product"))
            });
        let Some(container) = container else {
            continue;
        };

        let img = container
            .select(&thumb_sel)
            .next()
            .or_else(|| container.select(&img_sel).next());
        let Some(found_image) = img.and_then(image_url) else {
            continue;
        };

        if !name.is_empty() && !product_url.is_empty() {
            products.push(ScrapedProduct {
                name,
                image_url: found_image,
                product_url,
            });
        }
    }
    products
}

/// Read the total page count from the "Showing 1-16 of 989 results" counter,
/// falling back to the last pagination link.
fn total_pages(html: &str) -> u32 {
    use std::sync::LazyLock;
    static OF_RE: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"of\s+(\d+)").expect("Invalid regex"));

    let document = Html::parse_document(html);

    let count_sel = selector(".woocommerce-result-count");
    if let Some(counter) = document.select(&count_sel).next() {
        let text = counter.text().collect::<String>();
        if let Some(total) = OF_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return total.div_ceil(PRODUCTS_PER_PAGE);
        }
    }

    let page_sel = selector(".page-numbers:not(.next):not(.prev)");
    document
        .select(&page_sel)
        .filter_map(|el| el.text().collect::<String>().trim().parse::<u32>().ok())
        .max()
        .unwrap_or(FALLBACK_TOTAL_PAGES)
}

fn page_url(page: u32) -> String {
    if page == 1 {
        BASE_URL.to_string()
    } else {
        format!("{BASE_URL}page/{page}/")
    }
}

async fn fetch_page(client: &reqwest::Client, page: u32) -> Result<String, PipelineError> {
    let url = page_url(page);
    let response = client
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "text/html,application/xhtml+xml")
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::FetchFailed {
            url,
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// Scrape every listing page, deduplicating by product URL.
///
/// A failed page is logged and skipped; the remaining pages still run.
///
/// # Errors
///
/// Returns `PipelineError` only when the first page cannot be fetched, since
/// the page count comes from it.
pub async fn scrape_all() -> Result<ScrapeOutput, PipelineError> {
    let client = reqwest::Client::new();

    let first = fetch_page(&client, 1).await?;
    let pages = total_pages(&first);
    tracing::info!(pages, "Determined page count");

    let mut products = parse_page(&first);
    for page in 2..=pages {
        tokio::time::sleep(REQUEST_DELAY).await;
        match fetch_page(&client, page).await {
            Ok(html) => {
                let found = parse_page(&html);
                tracing::info!(page, count = found.len(), "Scraped page");
                products.extend(found);
            }
            Err(e) => tracing::warn!(page, "Skipping page: {e}"),
        }
    }

    let scraped_total = products.len();
    let mut seen = std::collections::HashSet::new();
    products.retain(|p| seen.insert(p.product_url.clone()));
    tracing::info!(
        scraped = scraped_total,
        unique = products.len(),
        "Deduplicated by product URL"
    );

    Ok(ScrapeOutput {
        total_pages: pages,
        total_products: products.len(),
        scraped_at: chrono::Utc::now().to_rfc3339(),
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <p class="woocommerce-result-count">Showing 1&ndash;16 of 989 results</p>
        <ul class="products">
          <li class="product type-product post-1">
            <img class="attachment-woocommerce_thumbnail"
                 src="data:image/gif;base64,placeholder"
                 data-src="https://i0.wp.com/singaporejews.com/x/challah.jpg?resize=450%2C450&amp;ssl=1">
            <h3 class="woocommerce-loop-product__title">
              <a href="https://singaporejews.com/product/challah/">Challah</a>
            </h3>
          </li>
          <li class="product type-product post-2">
            <img src="https://singaporejews.com/wp-content/woocommerce-placeholder.png">
            <h3 class="woocommerce-loop-product__title">
              <a href="https://singaporejews.com/product/no-image/">No Image</a>
            </h3>
          </li>
        </ul>
    "#;

    #[test]
    fn parses_products_preferring_data_src() {
        let products = parse_page(LISTING);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Challah");
        assert_eq!(
            products[0].image_url,
            "https://i0.wp.com/singaporejews.com/x/challah.jpg?ssl=1"
        );
        assert_eq!(
            products[0].product_url,
            "https://singaporejews.com/product/challah/"
        );
    }

    #[test]
    fn placeholder_images_are_dropped() {
        let products = parse_page(LISTING);
        assert!(products.iter().all(|p| p.name != "No Image"));
    }

    #[test]
    fn resize_params_are_stripped_keeping_ssl() {
        assert_eq!(
            full_quality_image_url("https://i0.wp.com/a/b.jpg?resize=450%2C450&ssl=1"),
            "https://i0.wp.com/a/b.jpg?ssl=1"
        );
        assert_eq!(
            full_quality_image_url("https://i0.wp.com/a/b.jpg?w=300&fit=300%2C300"),
            "https://i0.wp.com/a/b.jpg"
        );
        assert_eq!(full_quality_image_url("not a url"), "not a url");
    }

    #[test]
    fn page_count_comes_from_the_result_counter() {
        // 989 products at 16 per page -> 62 pages.
        assert_eq!(total_pages(LISTING), 62);
    }

    #[test]
    fn page_count_falls_back_to_pagination_links() {
        let html = r#"
            <nav><a class="page-numbers">1</a><a class="page-numbers">2</a>
            <a class="page-numbers">17</a><a class="page-numbers next">&rarr;</a></nav>
        "#;
        assert_eq!(total_pages(html), 17);
    }

    #[test]
    fn page_urls_follow_woocommerce_pagination() {
        assert_eq!(page_url(1), "https://singaporejews.com/shop/products/");
        assert_eq!(page_url(3), "https://singaporejews.com/shop/products/page/3/");
    }
}
