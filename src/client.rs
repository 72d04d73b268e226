//! HTTP client for the Pokémon lookup API.
//!
//! [`PokemonApi`] is the seam the search controller depends on;
//! [`PokeApiClient`] is the reqwest-backed implementation that talks to
//! PokeAPI (or anything serving the same `/pokemon/{name}` shape).

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::error::FetchError;
use crate::models::PokemonRecord;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Sprite fields checked for artwork, in display order.
const SPRITE_POINTERS: &[&str] = &[
    "/sprites/other/official-artwork/front_default",
    "/sprites/other/official-artwork/front_shiny",
    "/sprites/other/home/front_default",
    "/sprites/front_default",
    "/sprites/back_default",
    "/sprites/front_shiny",
    "/sprites/back_shiny",
];

/// A source of Pokémon records, one lookup per call.
#[async_trait]
pub trait PokemonApi: Send + Sync {
    /// Look up `name` exactly as given. Implementations must not cache.
    async fn fetch(&self, name: &str) -> Result<PokemonRecord, FetchError>;
}

#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build on an existing `reqwest::Client` so its connection pool can be
    /// shared with the sprite downloader.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/pokemon/{name}`, with `name` percent-encoded as a single
    /// path segment.
    pub fn endpoint(&self, name: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("pokemon")
            .push(name);
        Ok(url)
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl PokemonApi for PokeApiClient {
    async fn fetch(&self, name: &str) -> Result<PokemonRecord, FetchError> {
        let url = self.endpoint(name)?;
        tracing::debug!(%url, "requesting pokemon");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        let json: Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let record = parse_record(name, &json)?;
        tracing::debug!(
            name = %record.name,
            images = record.image_urls.len(),
            "pokemon decoded"
        );
        Ok(record)
    }
}

/// Extract a [`PokemonRecord`] from a `/pokemon/{name}` response body.
///
/// `abilities` and `types` must be arrays; sprites are optional.
pub fn parse_record(lookup: &str, json: &Value) -> Result<PokemonRecord, FetchError> {
    if !json.is_object() {
        return Err(FetchError::Decode("expected a JSON object".to_string()));
    }

    let name = json
        .get("name")
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(lookup)
        .to_lowercase();
    if name.is_empty() {
        return Err(FetchError::Decode("missing name".to_string()));
    }

    let abilities = named_entries(json, "abilities", "ability")?;
    let types = named_entries(json, "types", "type")?;

    let mut image_urls: Vec<String> = Vec::new();
    for pointer in SPRITE_POINTERS {
        if let Some(url) = json.pointer(pointer).and_then(|u| u.as_str()) {
            if !url.is_empty() && !image_urls.iter().any(|seen| seen == url) {
                image_urls.push(url.to_string());
            }
        }
    }

    Ok(PokemonRecord {
        name,
        image_urls,
        abilities,
        types,
    })
}

/// Collect `list[*].<inner>.name`, also accepting bare strings.
fn named_entries(json: &Value, list: &str, inner: &str) -> Result<Vec<String>, FetchError> {
    let arr = json
        .get(list)
        .and_then(|a| a.as_array())
        .ok_or_else(|| FetchError::Decode(format!("missing {list} list")))?;

    Ok(arr
        .iter()
        .filter_map(|it| {
            it.as_str()
                .or_else(|| {
                    it.get(inner)
                        .and_then(|v| v.get("name"))
                        .and_then(|n| n.as_str())
                })
                .map(|s| s.to_string())
        })
        .collect())
}
