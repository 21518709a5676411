use std::time::Duration;

use reqwest::{Client, StatusCode, header::USER_AGENT};
use scraper::Html;

use crate::{Error, Result};

/// Downloads `url` and reduces the HTML body to its text content.
pub async fn fetch_page_text(cfg: &ptracker_config::Fetch, url: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client.get(url).header(USER_AGENT, cfg.user_agent.as_str()).send().await?;
	let status = res.status();

	if status != StatusCode::OK {
		return Err(Error::UnexpectedStatus { status: status.as_u16(), url: url.to_string() });
	}

	let body = res.text().await?;

	Ok(html_to_text(&body))
}

/// Concatenates every text node of the parsed document in document order.
pub fn html_to_text(html: &str) -> String {
	let document = Html::parse_document(html);

	document.root_element().text().collect::<String>()
}
