use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::shared::config::ScrapeConfig;

/// Ошибки получения страницы товара
#[derive(Debug, Error)]
pub enum PageFetchError {
    #[error("Invalid product url: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("No product data on page: {0}")]
    NothingFound(String),
}

/// Поля товара, найденные на странице магазина
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedProduct {
    pub name: Option<String>,
    /// Цена в валюте страницы
    pub price: Option<f64>,
    pub image_urls: Vec<String>,
}

impl ScrapedProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.image_urls.is_empty()
    }
}

/// Источник данных о товаре по ссылке
#[async_trait]
pub trait ProductPageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScrapedProduct, PageFetchError>;
}

/// HTTP-клиент для страниц товаров (JSON-LD или OpenGraph)
pub struct HttpProductPageSource {
    client: reqwest::Client,
}

impl HttpProductPageSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self, PageFetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PageFetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProductPageSource for HttpProductPageSource {
    async fn fetch(&self, url: &str) -> Result<ScrapedProduct, PageFetchError> {
        let url = normalize_url(url)?;

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "ru-RU,ru;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| PageFetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| PageFetchError::Network(e.to_string()))?;

        let product = parse_product_page(&html);
        if product.is_empty() {
            return Err(PageFetchError::NothingFound(url.to_string()));
        }
        Ok(product)
    }
}

/// Проверяет схему и отрезает query string (трекинговые параметры магазинов)
pub fn normalize_url(url: &str) -> Result<&str, PageFetchError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(PageFetchError::InvalidUrl(url.to_string()));
    }
    Ok(url.split('?').next().unwrap_or(url))
}

/// Разбор HTML страницы товара: сначала JSON-LD `Product`, потом мета-теги
pub fn parse_product_page(html: &str) -> ScrapedProduct {
    let doc = Html::parse_document(html);

    if let Some(product) = json_ld_blocks(&doc).iter().find_map(product_from_json_ld) {
        return product;
    }

    let name = meta_contents(&doc, "og:title")
        .into_iter()
        .next()
        .map(|title| strip_cyrillic_words(&title))
        .filter(|title| !title.is_empty());
    let price = meta_contents(&doc, "product:price:amount")
        .into_iter()
        .find_map(|amount| parse_price(&amount));
    let image_urls = meta_contents(&doc, "og:image")
        .into_iter()
        .filter(|img| img.starts_with("http"))
        .collect();

    ScrapedProduct {
        name,
        price,
        image_urls,
    }
}

fn json_ld_blocks(doc: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|script| {
            let body = script.text().collect::<String>();
            serde_json::from_str::<Value>(body.trim()).ok()
        })
        .collect()
}

/// Значения `content` всех тегов `<meta property="...">` с указанным свойством
fn meta_contents(doc: &Html, property: &str) -> Vec<String> {
    let css = format!(r#"meta[property="{property}"]"#);
    let Ok(selector) = Selector::parse(&css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .collect()
}

fn product_from_json_ld(value: &Value) -> Option<ScrapedProduct> {
    match value {
        Value::Array(items) => items.iter().find_map(product_from_json_ld),
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                return product_from_json_ld(graph);
            }
            if !is_product_type(map.get("@type")?) {
                return None;
            }

            let name = map
                .get("name")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            let offers = match map.get("offers") {
                Some(Value::Array(list)) => list.first(),
                other => other,
            };
            let price = offers.and_then(|o| o.get("price")).and_then(|p| match p {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_price(s),
                _ => None,
            });

            let image_urls = match map.get("image") {
                Some(Value::String(s)) => vec![s.clone()],
                Some(Value::Array(list)) => list.iter().filter_map(image_url).collect(),
                Some(obj @ Value::Object(_)) => image_url(obj).into_iter().collect(),
                _ => Vec::new(),
            }
            .into_iter()
            .filter(|url| url.starts_with("http"))
            .collect();

            Some(ScrapedProduct {
                name,
                price,
                image_urls,
            })
        }
        _ => None,
    }
}

fn is_product_type(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "Product",
        Value::Array(types) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn parse_price(s: &str) -> Option<f64> {
    s.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

/// Убирает из названия слова с кириллицей:
/// "Bullpadel ракетка для паделя Vertex 04" -> "Bullpadel Vertex 04"
pub fn strip_cyrillic_words(name: &str) -> String {
    name.split_whitespace()
        .filter(|word| !word.chars().any(is_cyrillic))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_LD_PAGE: &str = r#"<html><head>
<script type="application/ld+json">{"@type":"BreadcrumbList","itemListElement":[]}</script>
<script type="application/ld+json">
{"@context":"https://schema.org","@type":"Product","name":"Asics Gel Tactic 2",
 "image":["https://cdn.shop.com/1.webp",{"url":"https://cdn.shop.com/2.webp"}],
 "offers":[{"@type":"Offer","price":"89.99","priceCurrency":"EUR"}]}
</script>
<meta property="og:title" content="Другое название">
</head></html>"#;

    const OG_PAGE: &str = r#"<html><head>
<meta property="og:title" content="Bullpadel ракетка для паделя Vertex 04 2025" />
<meta property="product:price:amount" content="219.95" />
<meta property="og:image" content="https://cdn.shop.com/a.jpg?w=1&amp;h=2" />
<meta property="og:image" content="/relative.jpg" />
<meta name="description" content="x">
</head></html>"#;

    #[test]
    fn test_json_ld_product_preferred() {
        let product = parse_product_page(JSON_LD_PAGE);
        assert_eq!(product.name.as_deref(), Some("Asics Gel Tactic 2"));
        assert_eq!(product.price, Some(89.99));
        assert_eq!(
            product.image_urls,
            vec!["https://cdn.shop.com/1.webp", "https://cdn.shop.com/2.webp"]
        );
    }

    #[test]
    fn test_open_graph_fallback() {
        let product = parse_product_page(OG_PAGE);
        assert_eq!(product.name.as_deref(), Some("Bullpadel Vertex 04 2025"));
        assert_eq!(product.price, Some(219.95));
        assert_eq!(product.image_urls, vec!["https://cdn.shop.com/a.jpg?w=1&h=2"]);
    }

    #[test]
    fn test_json_ld_graph_and_numeric_price() {
        let html = r#"<script type="application/ld+json">{"@graph":[{"@type":"WebPage"},
            {"@type":["Product"],"name":"Mikasa V200W","image":"https://cdn/v.png",
             "offers":{"price":75}}]}</script>"#;
        let product = parse_product_page(html);
        assert_eq!(product.name.as_deref(), Some("Mikasa V200W"));
        assert_eq!(product.price, Some(75.0));
        assert_eq!(product.image_urls, vec!["https://cdn/v.png"]);
    }

    #[test]
    fn test_single_quoted_and_uppercase_tags() {
        let html = "<HTML><HEAD>\
            <META property='og:title' content='Nike Air'>\
            <Meta PROPERTY=\"product:price:amount\" CONTENT=\"59.90\">\
            </HEAD></HTML>";
        let product = parse_product_page(html);
        assert_eq!(product.name.as_deref(), Some("Nike Air"));
        assert_eq!(product.price, Some(59.9));
    }

    #[test]
    fn test_html_entities_decoded() {
        let html = r#"<meta property="og:title" content="Nike &quot;Air&quot; Max">"#;
        let product = parse_product_page(html);
        assert_eq!(product.name.as_deref(), Some(r#"Nike "Air" Max"#));
    }

    #[test]
    fn test_broken_json_ld_falls_back_to_meta() {
        let html = r#"<script type="application/ld+json">{"@type": "Product",</script>
<meta property="og:title" content="Yonex Astrox 88D">"#;
        let product = parse_product_page(html);
        assert_eq!(product.name.as_deref(), Some("Yonex Astrox 88D"));
    }

    #[test]
    fn test_page_without_data() {
        let product = parse_product_page("<html><body>404</body></html>");
        assert!(product.is_empty());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url(" https://shop.com/p/1?utm_source=tg ").unwrap(),
            "https://shop.com/p/1"
        );
        assert!(matches!(
            normalize_url("shop.com/p/1"),
            Err(PageFetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            normalize_url("ftp://shop.com"),
            Err(PageFetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_strip_cyrillic_words() {
        assert_eq!(strip_cyrillic_words("Nike кроссовки Air  Max"), "Nike Air Max");
        assert_eq!(strip_cyrillic_words("только русские"), "");
    }

    #[tokio::test]
    async fn test_http_source_rejects_non_http_url() {
        let source = HttpProductPageSource::new(&ScrapeConfig::default()).unwrap();
        let result = source.fetch("file:///etc/passwd").await;
        assert!(matches!(result, Err(PageFetchError::InvalidUrl(_))));
    }
}
