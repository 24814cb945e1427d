//! Résolution locale d'abord des sources de lecture
//!
//! Le contrat que les couches cache et téléchargements doivent honorer :
//! dès qu'une piste est locale, toute demande de lecture ultérieure se
//! résout vers le fichier local, jamais vers le flux réseau. La
//! résolution est refaite à chaque mise en file ou reprise ; une piste
//! dont le téléchargement s'achève en cours de lecture passera en local
//! à sa prochaine résolution (pas de bascule à chaud du flux actif).

use jtdownloads::DownloadManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Source effective d'une piste au moment de la lecture
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackSource {
    /// Fichier audio local, complet par invariant du gestionnaire
    Local(PathBuf),
    /// URL de streaming du serveur
    Remote(String),
}

impl PlaybackSource {
    pub fn is_local(&self) -> bool {
        matches!(self, PlaybackSource::Local(_))
    }
}

/// Fournisseur des URLs de streaming du serveur
///
/// Implémenté par le client réseau Jellyfin, hors du périmètre de
/// cette crate.
pub trait RemoteSource: Send + Sync {
    /// URL de streaming d'une piste
    fn stream_url(&self, track_id: &str) -> String;
}

/// Résout chaque piste en source locale ou distante
pub struct SourceResolver {
    downloads: Arc<DownloadManager>,
    remote: Arc<dyn RemoteSource>,
}

impl SourceResolver {
    pub fn new(downloads: Arc<DownloadManager>, remote: Arc<dyn RemoteSource>) -> Self {
        Self { downloads, remote }
    }

    /// Résout une piste, local d'abord
    ///
    /// # Arguments
    ///
    /// * `track_id` - Identifiant serveur de la piste
    pub async fn resolve(&self, track_id: &str) -> PlaybackSource {
        if let Some(path) = self.downloads.local_path(track_id).await {
            debug!(track_id, path = %path.display(), "Resolved to local file");
            return PlaybackSource::Local(path);
        }
        PlaybackSource::Remote(self.remote.stream_url(track_id))
    }
}
