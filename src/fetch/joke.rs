// joke.rs - Joke Fetcher
// Random setup/punchline pair from the Official Joke API.

use super::{get_success_body, FetchResult};
use serde::Deserialize;

#[derive(Deserialize)]
struct Joke {
    setup: String,
    punchline: String,
}

pub async fn fetch(client: &reqwest::Client, url: &str) -> FetchResult {
    let body = get_success_body(client, url).await?;
    format_joke(&body)
}

pub fn format_joke(body: &str) -> FetchResult {
    let joke: Joke = serde_json::from_str(body)?;
    Ok(format!("{} - {}", joke.setup, joke.punchline))
}
