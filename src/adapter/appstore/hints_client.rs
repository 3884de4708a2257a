//! MZSearchHints client: keyword suggestions and trending searches.

use super::storefront::{accept_language, resolve_storefront};
use crate::error::UpstreamError;
use crate::popularity::SearchHint;
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_HINTS_BASE_URL: &str =
    "https://search.itunes.apple.com/WebObjects/MZSearchHints.woa/wa/";

/// Headers that make the provider answer like it would to the iOS App Store.
#[derive(Debug, Clone)]
pub struct StorefrontHeaders {
    pub user_agent: String,
    /// Fixed `Accept-Language`; when `None` it follows the country.
    pub accept_language: Option<String>,
    pub storefront_overrides: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct MzSearchHintsClient {
    client: Client,
    base_url: Url,
    headers: StorefrontHeaders,
}

impl MzSearchHintsClient {
    pub fn new(
        client: Client,
        base_url: &str,
        headers: StorefrontHeaders,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            headers,
        })
    }

    /// Suggestions for `keyword`, most popular first.
    pub async fn fetch_hints(
        &self,
        keyword: &str,
        country: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<SearchHint>, UpstreamError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("hints")?;
        url.query_pairs_mut()
            .append_pair("clientApplication", "Software")
            .append_pair("term", keyword);

        let body = self.get(url, country).await?;
        let mut hints = decode_hints(&body)?;
        // Stable: equal priorities keep the provider's order.
        hints.sort_by(|a, b| b.priority.cmp(&a.priority));
        truncate(&mut hints, max_count);

        debug!(keyword, country, hints = hints.len(), "fetched search hints");
        Ok(hints)
    }

    /// Trending searches in provider order.
    pub async fn fetch_trends(
        &self,
        country: &str,
        max_count: usize,
    ) -> Result<Vec<SearchHint>, UpstreamError> {
        let mut url = self.endpoint("trends")?;
        url.query_pairs_mut()
            .append_pair("maxCount", &max_count.to_string());

        let body = self.get(url, country).await?;
        let mut trends = decode_trends(&body)?;
        truncate(&mut trends, Some(max_count));

        debug!(country, trends = trends.len(), "fetched trends");
        Ok(trends)
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path)
            .map_err(|e| UpstreamError::Url(e.to_string()))
    }

    async fn get(&self, url: Url, country: &str) -> Result<Vec<u8>, UpstreamError> {
        let language = self
            .headers
            .accept_language
            .clone()
            .unwrap_or_else(|| accept_language(country).to_string());

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.headers.user_agent)
            .header("Accept", "*/*")
            .header("Accept-Language", language)
            .header(
                "X-Apple-Store-Front",
                resolve_storefront(country, &self.headers.storefront_overrides),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Join needs a trailing slash to keep the last path segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, UpstreamError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| UpstreamError::Url(format!("{raw}: {e}")))
}

fn truncate(items: &mut Vec<SearchHint>, max_count: Option<usize>) {
    if let Some(max) = max_count.filter(|m| *m > 0) {
        items.truncate(max);
    }
}

/// Decode a hints payload: property list (XML or binary), else JSON.
pub fn decode_hints(body: &[u8]) -> Result<Vec<SearchHint>, UpstreamError> {
    decode(body, false)
}

/// Like [`decode_hints`], but each item keeps its 1-based position.
pub fn decode_trends(body: &[u8]) -> Result<Vec<SearchHint>, UpstreamError> {
    decode(body, true)
}

fn decode(body: &[u8], ranked: bool) -> Result<Vec<SearchHint>, UpstreamError> {
    let value = match plist::Value::from_reader(std::io::Cursor::new(body)) {
        Ok(value) => plist_to_json(value),
        Err(plist_err) => serde_json::from_slice::<Value>(body).map_err(|json_err| {
            UpstreamError::Decode(format!("not a plist ({plist_err}) nor JSON ({json_err})"))
        })?,
    };

    let hints = extract_terms(&value)
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let term = ["term", "displayTerm", "text"]
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_str))?;
            let hint = SearchHint::new(term, lenient_priority(item.get("priority")));
            Some(if ranked {
                hint.with_rank(u32::try_from(i + 1).unwrap_or(u32::MAX))
            } else {
                hint
            })
        })
        .collect();
    Ok(hints)
}

/// A top-level array of dicts, or the first array inside a dict.
fn extract_terms(value: &Value) -> Vec<&Value> {
    let array = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.values().find_map(Value::as_array),
        _ => None,
    };
    array
        .map(|items| items.iter().filter(|v| v.is_object()).collect())
        .unwrap_or_default()
}

fn lenient_priority(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn plist_to_json(value: plist::Value) -> Value {
    match value {
        plist::Value::Array(items) => Value::Array(items.into_iter().map(plist_to_json).collect()),
        plist::Value::Dictionary(dict) => Value::Object(
            dict.into_iter()
                .map(|(k, v)| (k, plist_to_json(v)))
                .collect(),
        ),
        plist::Value::Boolean(b) => Value::Bool(b),
        plist::Value::Integer(i) => i
            .as_unsigned()
            .map(Value::from)
            .or_else(|| i.as_signed().map(Value::from))
            .unwrap_or(Value::Null),
        plist::Value::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        plist::Value::String(s) => Value::String(s),
        _ => Value::Null,
    }
}
