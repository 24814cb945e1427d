//! Gestion des erreurs pour le cache de couvertures

use jtfetch::FetchError;
use thiserror::Error;

/// Type Result personnalisé pour jtcovers
pub type Result<T> = std::result::Result<T, CoverError>;

/// Erreurs possibles lors de la résolution d'une couverture
///
/// Aucune de ces erreurs n'est mise en cache : un appel ultérieur
/// pour la même URL relance la récupération réseau.
#[derive(Error, Debug)]
pub enum CoverError {
    /// Erreur de récupération réseau
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// Payload corrompu ou format d'image non supporté
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Erreur d'entrée/sortie sur le tier disque
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Échec observé par un appelant coalescé sur la même URL
    ///
    /// Le message provient de l'erreur du téléchargement partagé ;
    /// l'appelant peut relancer `load_image` pour réessayer.
    #[error("Coalesced fetch failed: {0}")]
    Shared(String),
}
