//! # jtcovers - Cache d'images de couvertures pour JellyTone
//!
//! Cette crate fournit le cache d'artwork du client : un tier mémoire
//! LRU de bitmaps décodés et un tier disque persistant, clé par URL.
//!
//! ## Fonctionnalités
//!
//! - Résolution mémoire → disque → réseau, toujours en bitmap décodé
//! - Coalescence des ratés concurrents (une seule requête par URL)
//! - Éviction LRU bornée par budget d'octets et d'entrées
//! - Tier disque déterministe (`sha256(url).img`), sans index
//! - Les échecs ne sont jamais mis en cache
//!
//! ## Architecture
//!
//! ```text
//! jtcovers
//!     ├── cache.rs    - CoverCache (deux tiers + coalescence)
//!     ├── memory.rs   - Tier mémoire LRU
//!     └── error.rs    - Taxonomie des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use jtcovers::{CoverCache, MemoryBudget};
//! use jtfetch::HttpFetcher;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(HttpFetcher::new()?);
//!     let cache = Arc::new(CoverCache::new(
//!         "./cache_covers",
//!         MemoryBudget::default(),
//!         fetcher,
//!     )?);
//!
//!     let cover = cache.load_image("http://server/Items/42/Images/Primary").await?;
//!     println!("Couverture {}x{}", cover.width(), cover.height());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod memory;

#[cfg(feature = "config")]
pub mod config_ext;

pub use cache::{CoverCache, CoverImage, pk_from_url};
pub use error::{CoverError, Result};
pub use memory::MemoryBudget;

#[cfg(feature = "config")]
pub use config_ext::CoverCacheConfigExt;
