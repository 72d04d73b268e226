use serde::{Deserialize, Serialize};

/// One successfully fetched Pokémon.
///
/// Only ever built from a complete API response; the controller replaces it
/// whole on the next successful lookup.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct PokemonRecord {
    pub name: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl PokemonRecord {
    pub fn primary_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}
