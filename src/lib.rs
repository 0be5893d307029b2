//! Mushaf - navigation core of a button-driven Quran reading bot
//!
//! Caches remote catalogs, fetches them with bounded retries, pages long
//! listings, splits long texts into message-sized chunks and packs every
//! button's destination into a compact navigation token.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod health;
pub mod nav;
pub mod paginate;
pub mod search;
pub mod split;
pub mod transport;
pub mod ui;
pub mod views;

pub use error::{MushafError, MushafResult};
