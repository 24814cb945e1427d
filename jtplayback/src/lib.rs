//! # jtplayback - Façade de file de lecture pour JellyTone
//!
//! Cette crate porte le contrat de cohérence entre la lecture et le
//! stockage hors-ligne : la résolution de chaque piste demande d'abord
//! au gestionnaire de téléchargements, et ne se rabat sur le flux
//! réseau qu'en l'absence de copie locale. La mécanique de lecture
//! elle-même (décodage, sortie audio) appartient au framework média de
//! la plateforme et reste hors périmètre.
//!
//! ## Fonctionnalités
//!
//! - `SourceResolver` : résolution locale d'abord, refaite à chaque
//!   mise en file ou reprise
//! - `PlaybackQueue` : file ordonnée en mémoire (play, enqueue, next,
//!   previous, shuffle avec piste courante épinglée, seek borné)

pub mod queue;
pub mod resolver;

pub use queue::PlaybackQueue;
pub use resolver::{PlaybackSource, RemoteSource, SourceResolver};
