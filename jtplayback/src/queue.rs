//! File de lecture en mémoire
//!
//! État pur, sans liaison avec le framework média de la plateforme :
//! une liste ordonnée de pistes, un index courant et une position de
//! lecture. La résolution locale/distante est faite par l'appelant via
//! `SourceResolver` à chaque mise en lecture.

use jtdownloads::TrackDescriptor;
use rand::seq::SliceRandom;
use tracing::debug;

/// File de lecture ordonnée
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    tracks: Vec<TrackDescriptor>,
    current: Option<usize>,
    position_secs: f64,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la file et démarre à l'index donné
    ///
    /// Un index hors bornes est ramené à la dernière piste ; une liste
    /// vide laisse la file arrêtée.
    ///
    /// # Arguments
    ///
    /// * `tracks` - Nouvelles pistes de la file
    /// * `start` - Index de la piste à jouer en premier
    pub fn play(&mut self, tracks: Vec<TrackDescriptor>, start: usize) {
        self.tracks = tracks;
        self.current = if self.tracks.is_empty() {
            None
        } else {
            Some(start.min(self.tracks.len() - 1))
        };
        self.position_secs = 0.0;
        debug!(tracks = self.tracks.len(), start = ?self.current, "Queue replaced");
    }

    /// Insère une piste juste après la piste courante
    ///
    /// Dans une file vide, la piste devient la piste courante.
    pub fn enqueue_next(&mut self, track: TrackDescriptor) {
        match self.current {
            Some(i) => self.tracks.insert(i + 1, track),
            None => {
                self.tracks.insert(0, track);
                self.current = Some(0);
                self.position_secs = 0.0;
            }
        }
    }

    /// Ajoute une piste en fin de file
    pub fn enqueue_last(&mut self, track: TrackDescriptor) {
        self.tracks.push(track);
        if self.current.is_none() {
            self.current = Some(self.tracks.len() - 1);
            self.position_secs = 0.0;
        }
    }

    /// Avance à la piste suivante
    ///
    /// En fin de file, la lecture s'arrête (plus de piste courante).
    pub fn next(&mut self) -> Option<&TrackDescriptor> {
        let i = self.current?;
        self.position_secs = 0.0;
        if i + 1 < self.tracks.len() {
            self.current = Some(i + 1);
            self.tracks.get(i + 1)
        } else {
            self.current = None;
            None
        }
    }

    /// Revient à la piste précédente
    ///
    /// Sur la première piste, reste dessus (la position repart à zéro).
    pub fn previous(&mut self) -> Option<&TrackDescriptor> {
        let i = self.current?;
        self.position_secs = 0.0;
        self.current = Some(i.saturating_sub(1));
        self.tracks.get(i.saturating_sub(1))
    }

    /// Mélange la file en épinglant la piste courante
    ///
    /// La piste courante passe en tête, le reste est mélangé derrière
    /// elle. Sans piste courante, toute la file est mélangée.
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        match self.current {
            Some(i) => {
                let current = self.tracks.remove(i);
                self.tracks.shuffle(&mut rng);
                self.tracks.insert(0, current);
                self.current = Some(0);
            }
            None => self.tracks.shuffle(&mut rng),
        }
    }

    /// Positionne la lecture dans la piste courante
    ///
    /// La position est bornée à [0, durée de la piste]. No-op sans
    /// piste courante.
    pub fn seek(&mut self, secs: f64) {
        if let Some(track) = self.current_track() {
            let duration = track.duration_secs;
            self.position_secs = secs.clamp(0.0, duration);
        }
    }

    /// Vide la file et arrête la lecture
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
        self.position_secs = 0.0;
    }

    /// Piste courante
    pub fn current_track(&self) -> Option<&TrackDescriptor> {
        self.tracks.get(self.current?)
    }

    /// Position de lecture dans la piste courante
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Pistes restant à jouer après la piste courante
    pub fn up_next(&self) -> &[TrackDescriptor] {
        match self.current {
            Some(i) => &self.tracks[i + 1..],
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
