// quote.rs - Quote Fetcher
// Random quotation from the Quotable API.

use super::{get_success_body, FetchResult};
use serde::Deserialize;

#[derive(Deserialize)]
struct Quote {
    content: String,
    author: String,
}

pub async fn fetch(client: &reqwest::Client, url: &str) -> FetchResult {
    let body = get_success_body(client, url).await?;
    format_quote(&body)
}

pub fn format_quote(body: &str) -> FetchResult {
    let quote: Quote = serde_json::from_str(body)?;
    Ok(format!("{} - {}", quote.content, quote.author))
}
