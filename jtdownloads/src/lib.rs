//! # jtdownloads - Téléchargements hors-ligne pour JellyTone
//!
//! Cette crate gère le stockage local des pistes audio : transferts en
//! arrière-plan avec parallélisme borné, index SQLite doublé d'un index
//! mémoire pour des requêtes O(1), et artwork d'album mis en cache à
//! côté de l'audio.
//!
//! ## Fonctionnalités
//!
//! - Écriture en `.part` puis renommage : un fichier à son chemin final
//!   est toujours complet
//! - Annulation coopérative (retour à `NotDownloaded`, pas `Failed`)
//! - Disque plein distingué des erreurs réseau dans les états d'échec
//! - État d'album dérivé des états de pistes, jamais stocké
//! - Réconciliation index/disque au démarrage
//!
//! ## Architecture
//!
//! ```text
//! jtdownloads
//!     ├── manager.rs  - DownloadManager (orchestration)
//!     ├── index.rs    - Index SQLite (pistes + artwork)
//!     ├── model.rs    - TrackDescriptor, DownloadedTrack, DownloadedAlbum
//!     ├── state.rs    - DownloadState et agrégation par album
//!     └── error.rs    - Taxonomie des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use jtdownloads::DownloadManager;
//! use jtfetch::HttpFetcher;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(HttpFetcher::new()?);
//!     let manager = DownloadManager::new_with_reconciliation(
//!         "./downloads",
//!         fetcher,
//!         3,
//!     )?;
//!
//!     println!(
//!         "Stockage utilisé : {}",
//!         jtdownloads::format_bytes(manager.total_storage_used().await)
//!     );
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod index;
pub mod manager;
pub mod model;
pub mod state;

#[cfg(feature = "config")]
pub mod config_ext;

pub use error::{DownloadError, Result};
pub use index::DownloadDb;
pub use manager::DownloadManager;
pub use model::{DownloadedAlbum, DownloadedTrack, TrackDescriptor};
pub use state::{DownloadState, FailureKind, album_state};

#[cfg(feature = "config")]
pub use config_ext::DownloadsConfigExt;

/// Formate une taille en octets pour l'affichage
///
/// # Exemples
///
/// ```
/// assert_eq!(jtdownloads::format_bytes(512), "512 B");
/// assert_eq!(jtdownloads::format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Formate une durée en secondes pour l'affichage
///
/// # Exemples
///
/// ```
/// assert_eq!(jtdownloads::format_duration(245.0), "4:05");
/// assert_eq!(jtdownloads::format_duration(3723.0), "1:02:03");
/// ```
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
