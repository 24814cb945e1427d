//! Gestion des erreurs pour la frontière média
//!
//! Toutes les erreurs de récupération sont récupérables : l'appelant
//! peut relancer la requête lors de la prochaine action utilisateur.

use thiserror::Error;

/// Type Result personnalisé pour jtfetch
pub type Result<T> = std::result::Result<T, FetchError>;

/// Erreurs possibles lors de la récupération d'une ressource distante
#[derive(Error, Debug)]
pub enum FetchError {
    /// Erreur de transport (hôte injoignable, timeout, connexion coupée)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Réponse HTTP non-2xx
    #[error("HTTP error: {code}")]
    Status { code: u16 },

    /// Erreur d'entrée/sortie locale
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
