//! Look up a Pokémon by name and present the result.
//!
//! [`client`] performs one HTTP lookup per call; [`controller`] turns
//! submissions into a single observable [`controller::SearchState`]; the
//! remaining modules are the terminal presentation built on top of it.

pub mod client;
pub mod config;
pub mod controller;
pub mod cycler;
pub mod error;
pub mod logging;
pub mod models;
pub mod sprites;
pub mod ui;
pub mod utils;

pub use client::{PokeApiClient, PokemonApi};
pub use controller::{SearchController, SearchState};
pub use error::{ErrorKind, FetchError};
pub use models::PokemonRecord;
