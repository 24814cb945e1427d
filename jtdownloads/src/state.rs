//! États de téléchargement et agrégation par album
//!
//! L'état par piste est la seule source de vérité ; l'état d'un album
//! est toujours dérivé des états de ses pistes, jamais stocké.

use serde::{Deserialize, Serialize};

/// Cause d'échec d'un téléchargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Erreur réseau (transfert interrompu, statut HTTP, timeout)
    Network,
    /// Espace disque insuffisant
    DiskFull,
    /// Autre erreur locale (fichier, index)
    Io,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::DiskFull => write!(f, "disk full"),
            FailureKind::Io => write!(f, "i/o"),
        }
    }
}

/// État d'une piste vis-à-vis du stockage hors-ligne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DownloadState {
    /// Absente du stockage local
    NotDownloaded,
    /// Transfert en cours (progress dans [0, 1])
    Downloading { progress: f32 },
    /// Présente et complète sur disque
    Downloaded,
    /// Dernière tentative échouée ; pas de retry automatique
    Failed { reason: FailureKind },
}

impl DownloadState {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, DownloadState::Downloaded)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, DownloadState::Downloading { .. })
    }
}

/// Dérive l'état agrégé d'un album depuis les états de ses pistes
///
/// Règles :
/// - toutes téléchargées => `Downloaded`
/// - au moins une téléchargée ou en vol => `Downloading` avec pour
///   progression la fraction de pistes complètes
/// - sinon (y compris échecs seuls) => `NotDownloaded`
///
/// # Arguments
///
/// * `states` - États des pistes de l'album
pub fn album_state(states: &[DownloadState]) -> DownloadState {
    if states.is_empty() {
        return DownloadState::NotDownloaded;
    }

    let total = states.len();
    let completed = states.iter().filter(|s| s.is_downloaded()).count();
    if completed == total {
        return DownloadState::Downloaded;
    }

    let in_flight = states.iter().any(|s| s.is_in_flight());
    if completed == 0 && !in_flight {
        return DownloadState::NotDownloaded;
    }

    DownloadState::Downloading {
        progress: completed as f32 / total as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_state_empty() {
        assert_eq!(album_state(&[]), DownloadState::NotDownloaded);
    }

    #[test]
    fn test_album_state_all_downloaded() {
        let states = [DownloadState::Downloaded, DownloadState::Downloaded];
        assert_eq!(album_state(&states), DownloadState::Downloaded);
    }

    #[test]
    fn test_album_state_partial() {
        let states = [
            DownloadState::Downloaded,
            DownloadState::NotDownloaded,
            DownloadState::NotDownloaded,
        ];
        match album_state(&states) {
            DownloadState::Downloading { progress } => {
                assert!((progress - 1.0 / 3.0).abs() < 1e-6);
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_album_state_in_flight_counts_completed_only() {
        let states = [
            DownloadState::Downloaded,
            DownloadState::Downloading { progress: 0.9 },
        ];
        match album_state(&states) {
            DownloadState::Downloading { progress } => {
                assert!((progress - 0.5).abs() < 1e-6);
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_album_state_failures_only() {
        let states = [
            DownloadState::Failed {
                reason: FailureKind::Network,
            },
            DownloadState::NotDownloaded,
        ];
        assert_eq!(album_state(&states), DownloadState::NotDownloaded);
    }

    #[test]
    fn test_album_state_failure_with_one_downloaded() {
        let states = [
            DownloadState::Downloaded,
            DownloadState::Failed {
                reason: FailureKind::Network,
            },
            DownloadState::NotDownloaded,
        ];
        match album_state(&states) {
            DownloadState::Downloading { progress } => {
                assert!((progress - 1.0 / 3.0).abs() < 1e-6);
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }
}
