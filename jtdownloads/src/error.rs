//! Taxonomie des erreurs de téléchargement

use crate::state::FailureKind;
use jtfetch::FetchError;
use thiserror::Error;

/// Erreurs du gestionnaire de téléchargements
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// Flux terminé avant d'avoir livré la taille annoncée
    #[error("Truncated transfer: got {written} of {expected} bytes")]
    Truncated { expected: u64, written: u64 },

    /// Distingué des autres erreurs d'E/S car l'utilisateur peut agir
    /// (libérer de l'espace) là où un retry serait inutile
    #[error("Insufficient disk space")]
    DiskFull,

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Index error: {0}")]
    Index(#[from] rusqlite::Error),

    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Classe une erreur d'E/S, en isolant le disque plein
    pub fn from_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::StorageFull {
            DownloadError::DiskFull
        } else {
            DownloadError::Io(err)
        }
    }

    /// Cause d'échec à exposer dans `DownloadState::Failed`
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DownloadError::Network(_) | DownloadError::Truncated { .. } => FailureKind::Network,
            DownloadError::DiskFull => FailureKind::DiskFull,
            _ => FailureKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_full_is_classified() {
        let err = std::io::Error::new(std::io::ErrorKind::StorageFull, "no space");
        let classified = DownloadError::from_io(err);
        assert!(matches!(classified, DownloadError::DiskFull));
        assert_eq!(classified.failure_kind(), FailureKind::DiskFull);
    }

    #[test]
    fn test_other_io_stays_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let classified = DownloadError::from_io(err);
        assert!(matches!(classified, DownloadError::Io(_)));
        assert_eq!(classified.failure_kind(), FailureKind::Io);
    }

    #[test]
    fn test_network_failure_kind() {
        let err = DownloadError::Network(FetchError::Status { code: 503 });
        assert_eq!(err.failure_kind(), FailureKind::Network);
    }

    #[test]
    fn test_truncation_is_a_network_failure() {
        let err = DownloadError::Truncated {
            expected: 1000,
            written: 300,
        };
        assert_eq!(err.failure_kind(), FailureKind::Network);
    }
}
