//! Modèles de données des téléchargements
//!
//! `TrackDescriptor` est fourni par l'appelant au moment de lancer un
//! téléchargement ; `DownloadedTrack` est l'enregistrement immuable
//! écrit une fois le transfert complet. `DownloadedAlbum` est un
//! groupement dérivé, jamais persisté.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Description d'une piste à télécharger
///
/// Porte tout ce qu'il faut pour effectuer le transfert et peupler
/// l'index : identité, métadonnées d'affichage et URLs du serveur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Identifiant serveur de la piste
    pub track_id: String,
    /// Identifiant serveur de l'album
    pub album_id: String,
    pub album_name: String,
    pub artist_name: String,
    pub track_name: String,
    pub track_number: u32,
    pub duration_secs: f64,
    /// Extension du conteneur audio (ex: "flac", "mp3")
    pub container: String,
    /// URL de streaming du fichier audio
    pub stream_url: String,
    /// URL de la couverture de l'album, si disponible
    pub artwork_url: Option<String>,
}

/// Piste téléchargée, telle qu'enregistrée dans l'index
///
/// Immuable après écriture : un enregistrement n'existe que si le
/// fichier correspondant est complet sur disque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedTrack {
    pub track_id: String,
    pub album_id: String,
    pub album_name: String,
    pub artist_name: String,
    pub track_name: String,
    pub track_number: u32,
    pub duration_secs: f64,
    /// Taille du fichier audio en octets
    pub file_size: u64,
    /// Chemin absolu du fichier audio local
    pub file_path: PathBuf,
    /// Date de fin du téléchargement (RFC3339)
    pub completed_at: String,
}

/// Album téléchargé, dérivé des pistes présentes dans l'index
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedAlbum {
    pub album_id: String,
    pub album_name: String,
    pub artist_name: String,
    /// Pistes locales de l'album, triées par numéro de piste
    pub tracks: Vec<DownloadedTrack>,
}

impl DownloadedAlbum {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Taille totale des fichiers audio de l'album
    pub fn total_size(&self) -> u64 {
        self.tracks.iter().map(|t| t.file_size).sum()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration_secs).sum()
    }

    /// Durée totale de l'album, prête pour l'affichage
    pub fn formatted_duration(&self) -> String {
        crate::format_duration(self.total_duration_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: u32, size: u64, duration: f64) -> DownloadedTrack {
        DownloadedTrack {
            track_id: format!("t{}", n),
            album_id: "a1".to_string(),
            album_name: "Album".to_string(),
            artist_name: "Artist".to_string(),
            track_name: format!("Track {}", n),
            track_number: n,
            duration_secs: duration,
            file_size: size,
            file_path: PathBuf::from(format!("/tmp/t{}.flac", n)),
            completed_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_album_totals() {
        let album = DownloadedAlbum {
            album_id: "a1".to_string(),
            album_name: "Album".to_string(),
            artist_name: "Artist".to_string(),
            tracks: vec![track(1, 10, 120.0), track(2, 5, 60.5)],
        };
        assert_eq!(album.track_count(), 2);
        assert_eq!(album.total_size(), 15);
        assert!((album.total_duration_secs() - 180.5).abs() < 1e-9);
        assert_eq!(album.formatted_duration(), "3:01");
    }
}
