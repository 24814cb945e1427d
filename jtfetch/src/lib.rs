//! # jtfetch - Frontière d'accès à la source média pour JellyTone
//!
//! Cette crate isole le cœur hors-ligne (caches et téléchargements) du
//! client REST Jellyfin complet : tout ce que le cœur consomme se réduit à
//! `GET bytes(url) -> bytes | error`.
//!
//! ## Architecture
//!
//! ```text
//! jtfetch
//!     ├── error.rs    - Taxonomie des erreurs de récupération
//!     └── fetcher.rs  - Trait MediaFetcher + implémentation reqwest
//!
//! jtcovers / jtdownloads
//!     └── Reçoivent un Arc<dyn MediaFetcher> injecté à la construction
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use jtfetch::{HttpFetcher, MediaFetcher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher: Arc<dyn MediaFetcher> = Arc::new(HttpFetcher::new()?);
//!     let bytes = fetcher.fetch_bytes("http://server/Items/42/Images/Primary").await?;
//!     println!("{} octets récupérés", bytes.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fetcher;

pub use error::{FetchError, Result};
pub use fetcher::{ByteStream, FetchStream, HttpFetcher, MediaFetcher};
