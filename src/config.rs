//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::client::DEFAULT_BASE_URL;

/// Look up a Pokémon by name from PokeAPI
#[derive(Parser, Debug, Clone)]
#[command(name = "pokemon_search_tui")]
#[command(about = "Look up a Pokémon by name and show its artwork, abilities and types")]
#[command(version)]
pub struct Config {
    /// Base URL of the lookup API
    #[arg(long, env = "POKEAPI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Text pre-filled in the search box
    #[arg(long, default_value = "Mew")]
    pub query: String,

    /// Milliseconds between images while cycling is on
    #[arg(long, env = "POKEMON_CYCLE_MS", default_value_t = 1500)]
    pub cycle_ms: u64,

    /// File that receives log output; logging is off when unset
    #[arg(long, env = "POKEMON_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single lookup, print the result and exit without the UI
    #[arg(long, value_name = "NAME")]
    pub lookup: Option<String>,
}
