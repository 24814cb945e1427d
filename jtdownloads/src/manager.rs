//! Gestionnaire de téléchargements hors-ligne
//!
//! Orchestre les transferts audio vers le stockage local : écriture en
//! `.part` puis renommage atomique, parallélisme borné par sémaphore,
//! annulation coopérative, et index en mémoire adossé à SQLite pour
//! des réponses O(1) sans toucher le disque.
//!
//! Invariant central : un fichier présent à son chemin final est
//! complet. Tout ce qui est partiel porte le suffixe `.part` et est
//! supprimé à l'annulation, à l'échec ou à la réconciliation.

use crate::error::{DownloadError, Result};
use crate::index::DownloadDb;
use crate::model::{DownloadedAlbum, DownloadedTrack, TrackDescriptor};
use crate::state::{DownloadState, album_state};
use futures_util::StreamExt;
use jtfetch::MediaFetcher;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Nom du fichier de base de données dans le répertoire de téléchargements
const DB_FILENAME: &str = "downloads.db";

/// Téléchargement en vol
///
/// La génération identifie la tentative propriétaire de l'entrée : une
/// tâche mourante ne retire l'entrée que si c'est encore la sienne, un
/// re-téléchargement lancé pendant l'annulation de l'ancienne tentative
/// reste donc suivi dans la map.
struct ActiveDownload {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Gestionnaire de téléchargements
///
/// Conçu pour être construit une fois au démarrage et partagé derrière
/// un `Arc` ; les dépendances (fetcher) sont injectées à la
/// construction.
pub struct DownloadManager {
    /// Répertoire des fichiers audio
    audio_dir: PathBuf,
    /// Répertoire de l'artwork d'album
    artwork_dir: PathBuf,
    /// Index persistant
    db: DownloadDb,
    /// Frontière réseau injectée
    fetcher: Arc<dyn MediaFetcher>,
    /// Index en mémoire des pistes complètes (track_id -> enregistrement)
    index: RwLock<HashMap<String, DownloadedTrack>>,
    /// États observables par piste
    states: RwLock<HashMap<String, DownloadState>>,
    /// Téléchargements en vol
    active: Mutex<HashMap<String, ActiveDownload>>,
    /// Générateur de générations pour `ActiveDownload`
    generations: AtomicU64,
    /// Borne de parallélisme des transferts
    semaphore: Arc<Semaphore>,
}

impl DownloadManager {
    /// Crée un gestionnaire de téléchargements
    ///
    /// Charge l'index depuis SQLite : les requêtes `is_downloaded` et
    /// `local_path` répondent dès le retour, sans parcours du disque.
    ///
    /// # Arguments
    ///
    /// * `dir` - Répertoire racine des téléchargements
    /// * `fetcher` - Accès réseau injecté
    /// * `max_parallel` - Nombre maximal de transferts simultanés
    pub fn new(
        dir: impl AsRef<Path>,
        fetcher: Arc<dyn MediaFetcher>,
        max_parallel: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let audio_dir = dir.join("audio");
        let artwork_dir = dir.join("artwork");
        std::fs::create_dir_all(&audio_dir).map_err(DownloadError::from_io)?;
        std::fs::create_dir_all(&artwork_dir).map_err(DownloadError::from_io)?;

        let db = DownloadDb::init(&dir.join(DB_FILENAME))?;

        let mut index = HashMap::new();
        let mut states = HashMap::new();
        for track in db.get_all()? {
            states.insert(track.track_id.clone(), DownloadState::Downloaded);
            index.insert(track.track_id.clone(), track);
        }

        info!(
            dir = %dir.display(),
            tracks = index.len(),
            max_parallel,
            "Download manager initialized"
        );

        Ok(Self {
            audio_dir,
            artwork_dir,
            db,
            fetcher,
            index: RwLock::new(index),
            states: RwLock::new(states),
            active: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
            semaphore: Arc::new(Semaphore::new(max_parallel.max(1))),
        })
    }

    /// Crée un gestionnaire et lance la réconciliation en arrière-plan
    ///
    /// La réconciliation répare les divergences index/disque laissées
    /// par un crash ; elle ne bloque pas le démarrage.
    pub fn new_with_reconciliation(
        dir: impl AsRef<Path>,
        fetcher: Arc<dyn MediaFetcher>,
        max_parallel: usize,
    ) -> Result<Arc<Self>> {
        let manager = Arc::new(Self::new(dir, fetcher, max_parallel)?);

        let background = Arc::clone(&manager);
        tokio::spawn(async move {
            if let Err(e) = background.reconcile().await {
                warn!(error = %e, "Startup reconciliation failed");
            }
        });

        Ok(manager)
    }

    /// Chemin final du fichier audio d'une piste
    fn audio_path(&self, track_id: &str, container: &str) -> PathBuf {
        self.audio_dir.join(format!("{}.{}", track_id, container))
    }

    /// Chemin du fichier d'artwork d'un album
    fn artwork_path(&self, album_id: &str) -> PathBuf {
        self.artwork_dir.join(format!("{}.img", album_id))
    }

    /// Lance le téléchargement d'une piste
    ///
    /// Idempotent : no-op si la piste est déjà téléchargée ou si un
    /// transfert est déjà en vol pour elle. Le transfert s'exécute en
    /// tâche de fond ; l'état passe immédiatement à `Downloading`.
    pub async fn download_track(self: &Arc<Self>, track: TrackDescriptor) {
        if self.is_downloaded(&track.track_id).await {
            debug!(track_id = %track.track_id, "Track already downloaded, skipping");
            return;
        }

        let mut active = self.active.lock().await;
        if active.contains_key(&track.track_id) {
            debug!(track_id = %track.track_id, "Download already in flight, skipping");
            return;
        }

        // État visible avant le retour, enregistrement avant le spawn
        // pour fermer la course avec delete_download
        self.states.write().await.insert(
            track.track_id.clone(),
            DownloadState::Downloading { progress: 0.0 },
        );

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let task_token = token.clone();
        let track_id = track.track_id.clone();
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            manager.run_download(track, task_token, generation).await;
        });

        active.insert(
            track_id,
            ActiveDownload {
                generation,
                token,
                handle,
            },
        );
    }

    /// Lance le téléchargement de toutes les pistes d'un album
    ///
    /// Les pistes déjà locales sont ignorées ; le parallélisme reste
    /// borné par le sémaphore partagé.
    pub async fn download_album(self: &Arc<Self>, tracks: Vec<TrackDescriptor>) {
        for track in tracks {
            self.download_track(track).await;
        }
    }

    /// Exécute un transfert puis publie son résultat
    async fn run_download(&self, track: TrackDescriptor, token: CancellationToken, generation: u64) {
        let track_id = track.track_id.clone();
        let result = self.transfer(&track, &token).await;

        match result {
            Ok(downloaded) => {
                // L'artwork est tenté avant de publier l'état final ;
                // son échec n'affecte pas la piste
                self.ensure_artwork(&track).await;

                match self.db.add(&downloaded) {
                    Ok(()) => {
                        info!(
                            track_id = %track_id,
                            size = downloaded.file_size,
                            "Track downloaded"
                        );
                        self.index
                            .write()
                            .await
                            .insert(track_id.clone(), downloaded);
                        self.states
                            .write()
                            .await
                            .insert(track_id.clone(), DownloadState::Downloaded);
                    }
                    Err(e) => {
                        // Fichier sans ligne d'index : on le retire pour
                        // préserver l'invariant fichier final = complet
                        warn!(track_id = %track_id, error = %e, "Index write failed");
                        let _ = tokio::fs::remove_file(&downloaded.file_path).await;
                        self.states.write().await.insert(
                            track_id.clone(),
                            DownloadState::Failed {
                                reason: DownloadError::from(e).failure_kind(),
                            },
                        );
                    }
                }
            }
            Err(DownloadError::Cancelled) => {
                debug!(track_id = %track_id, "Download cancelled");
                // L'état n'est retiré que si aucune tentative plus
                // récente n'a repris la piste à son compte
                let active = self.active.lock().await;
                let superseded = active
                    .get(&track_id)
                    .is_some_and(|download| download.generation != generation);
                if !superseded {
                    self.states.write().await.remove(&track_id);
                }
            }
            Err(e) => {
                warn!(track_id = %track_id, error = %e, "Download failed");
                self.states.write().await.insert(
                    track_id.clone(),
                    DownloadState::Failed {
                        reason: e.failure_kind(),
                    },
                );
            }
        }

        // Retrait de la map uniquement si l'entrée appartient encore à
        // cette tentative : un canceller (delete_download, cancel_all)
        // a pu la retirer et un re-téléchargement en insérer une
        // nouvelle pendant qu'il attendait la fin de cette tâche
        let mut active = self.active.lock().await;
        if active
            .get(&track_id)
            .is_some_and(|download| download.generation == generation)
        {
            active.remove(&track_id);
        }
    }

    /// Transfert effectif : flux réseau vers `.part`, puis renommage
    async fn transfer(
        &self,
        track: &TrackDescriptor,
        token: &CancellationToken,
    ) -> Result<DownloadedTrack> {
        let permit = tokio::select! {
            _ = token.cancelled() => return Err(DownloadError::Cancelled),
            permit = self.semaphore.acquire() => {
                permit.map_err(|_| DownloadError::Cancelled)?
            }
        };
        let _permit = permit;

        let fetched = self.fetcher.fetch_stream(&track.stream_url).await?;
        let expected_len = fetched.expected_len;
        let mut stream = fetched.stream;

        let final_path = self.audio_path(&track.track_id, &track.container);
        let part_path = final_path.with_extension(format!("{}.part", track.container));

        let mut file = tokio::fs::File::create(&part_path)
            .await
            .map_err(DownloadError::from_io)?;
        let mut written: u64 = 0;

        loop {
            let chunk = tokio::select! {
                _ = token.cancelled() => {
                    drop(file);
                    self.discard_partial(&part_path).await;
                    return Err(DownloadError::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else { break };
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    drop(file);
                    self.discard_partial(&part_path).await;
                    return Err(e.into());
                }
            };

            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                self.discard_partial(&part_path).await;
                return Err(DownloadError::from_io(e));
            }
            written += chunk.len() as u64;

            if let Some(expected) = expected_len {
                if expected > 0 {
                    let progress = (written as f64 / expected as f64).min(1.0) as f32;
                    self.states.write().await.insert(
                        track.track_id.clone(),
                        DownloadState::Downloading { progress },
                    );
                }
            }
        }

        if let Err(e) = file.flush().await {
            drop(file);
            self.discard_partial(&part_path).await;
            return Err(DownloadError::from_io(e));
        }
        drop(file);

        // Un flux qui se termine proprement sans avoir livré la taille
        // annoncée est une troncature, pas un fichier complet
        if let Some(expected) = expected_len {
            if written != expected {
                self.discard_partial(&part_path).await;
                return Err(DownloadError::Truncated { expected, written });
            }
        }

        // Renommage atomique : le fichier n'apparaît à son chemin
        // final qu'une fois complet
        if let Err(e) = tokio::fs::rename(&part_path, &final_path).await {
            self.discard_partial(&part_path).await;
            return Err(DownloadError::from_io(e));
        }

        Ok(DownloadedTrack {
            track_id: track.track_id.clone(),
            album_id: track.album_id.clone(),
            album_name: track.album_name.clone(),
            artist_name: track.artist_name.clone(),
            track_name: track.track_name.clone(),
            track_number: track.track_number,
            duration_secs: track.duration_secs,
            file_size: written,
            file_path: final_path,
            completed_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Supprime un fichier partiel, sans propager l'erreur
    async fn discard_partial(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove partial file");
            }
        }
    }

    /// Récupère l'artwork de l'album d'une piste, si absent
    ///
    /// Meilleur effort : un échec est journalisé mais ne fait pas
    /// échouer le téléchargement de la piste.
    async fn ensure_artwork(&self, track: &TrackDescriptor) {
        let Some(url) = &track.artwork_url else {
            return;
        };

        if let Ok(Some(path)) = self.db.get_artwork(&track.album_id) {
            if path.exists() {
                return;
            }
        }

        let bytes = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(album_id = %track.album_id, error = %e, "Artwork fetch failed");
                return;
            }
        };

        let path = self.artwork_path(&track.album_id);
        let part = path.with_extension("img.part");
        let write = async {
            tokio::fs::write(&part, &bytes).await?;
            tokio::fs::rename(&part, &path).await
        };
        if let Err(e) = write.await {
            warn!(album_id = %track.album_id, error = %e, "Artwork write failed");
            self.discard_partial(&part).await;
            return;
        }

        if let Err(e) = self.db.set_artwork(&track.album_id, &path) {
            warn!(album_id = %track.album_id, error = %e, "Artwork index write failed");
            let _ = tokio::fs::remove_file(&path).await;
            return;
        }

        debug!(album_id = %track.album_id, "Album artwork cached");
    }

    /// Teste si une piste est locale (O(1), sans accès disque)
    pub async fn is_downloaded(&self, track_id: &str) -> bool {
        self.index.read().await.contains_key(track_id)
    }

    /// Chemin local du fichier audio d'une piste téléchargée
    pub async fn local_path(&self, track_id: &str) -> Option<PathBuf> {
        self.index
            .read()
            .await
            .get(track_id)
            .map(|t| t.file_path.clone())
    }

    /// État courant d'une piste
    pub async fn state_of(&self, track_id: &str) -> DownloadState {
        self.states
            .read()
            .await
            .get(track_id)
            .copied()
            .unwrap_or(DownloadState::NotDownloaded)
    }

    /// État agrégé d'un album, dérivé des états de ses pistes
    pub async fn album_state_of(&self, track_ids: &[String]) -> DownloadState {
        let states = self.states.read().await;
        let per_track: Vec<DownloadState> = track_ids
            .iter()
            .map(|id| {
                states
                    .get(id)
                    .copied()
                    .unwrap_or(DownloadState::NotDownloaded)
            })
            .collect();
        album_state(&per_track)
    }

    /// Attend qu'une piste quitte l'état `Downloading`
    pub async fn wait_until_settled(&self, track_id: &str) {
        loop {
            match self.state_of(track_id).await {
                DownloadState::Downloading { .. } => {
                    tokio::time::sleep(Duration::from_millis(25)).await;
                }
                _ => return,
            }
        }
    }

    /// Supprime le téléchargement d'une piste
    ///
    /// Annule d'abord un transfert en vol (retour à `NotDownloaded`,
    /// jamais `Failed`), puis retire fichier, ligne d'index et entrée
    /// mémoire. L'artwork de l'album est récupéré quand la dernière
    /// piste locale de l'album disparaît. No-op si rien n'est local.
    pub async fn delete_download(&self, track_id: &str) -> Result<()> {
        let active = self.active.lock().await.remove(track_id);
        if let Some(active) = active {
            active.token.cancel();
            let _ = active.handle.await;
        }

        let removed = self.index.write().await.remove(track_id);
        let Some(track) = removed else {
            // Efface aussi un éventuel état Failed résiduel
            self.states.write().await.remove(track_id);
            return Ok(());
        };

        if let Err(e) = tokio::fs::remove_file(&track.file_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                // Réinsérer : l'index doit refléter ce qui est sur disque
                self.index
                    .write()
                    .await
                    .insert(track_id.to_string(), track);
                return Err(DownloadError::from_io(e));
            }
        }

        self.db.delete(track_id)?;
        self.states.write().await.remove(track_id);
        info!(track_id, "Download deleted");

        let album_empty = !self
            .index
            .read()
            .await
            .values()
            .any(|t| t.album_id == track.album_id);
        if album_empty {
            self.delete_cached_artwork(&track.album_id).await?;
        }

        Ok(())
    }

    /// Supprime tous les téléchargements
    ///
    /// Annule d'abord tous les transferts en vol. Chaque piste est
    /// traitée individuellement : si un fichier résiste à la
    /// suppression, son entrée d'index est conservée pour que l'index
    /// continue de refléter le disque, et la première erreur est
    /// retournée en fin de parcours.
    pub async fn delete_all_downloads(&self) -> Result<()> {
        self.cancel_all().await;

        let tracks: Vec<DownloadedTrack> = self.index.read().await.values().cloned().collect();
        let mut first_err: Option<DownloadError> = None;

        for track in tracks {
            match tokio::fs::remove_file(&track.file_path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(
                        track_id = %track.track_id,
                        error = %e,
                        "Failed to remove downloaded file"
                    );
                    if first_err.is_none() {
                        first_err = Some(DownloadError::from_io(e));
                    }
                    continue;
                }
            }

            self.db.delete(&track.track_id)?;
            self.index.write().await.remove(&track.track_id);
            self.states.write().await.remove(&track.track_id);
        }

        // Artwork des albums qui n'ont plus de piste locale
        for (album_id, path) in self.db.get_all_artwork()? {
            let album_empty = !self
                .index
                .read()
                .await
                .values()
                .any(|t| t.album_id == album_id);
            if album_empty {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(album_id, error = %e, "Failed to remove artwork file");
                    }
                }
                self.db.delete_artwork(&album_id)?;
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                info!("All downloads deleted");
                Ok(())
            }
        }
    }

    /// Annule tous les transferts en vol et attend leur arrêt
    pub async fn cancel_all(&self) {
        let drained: Vec<ActiveDownload> = {
            let mut active = self.active.lock().await;
            active.drain().map(|(_, download)| download).collect()
        };

        for download in &drained {
            download.token.cancel();
        }
        for download in drained {
            let _ = download.handle.await;
        }
    }

    /// Chemin local de l'artwork d'un album téléchargé
    ///
    /// Retourne `None` si l'artwork n'est pas en cache ou si le fichier
    /// a disparu du disque.
    pub async fn cached_artwork_path(&self, album_id: &str) -> Option<PathBuf> {
        let path = self.db.get_artwork(album_id).ok().flatten()?;
        path.exists().then_some(path)
    }

    /// Supprime l'artwork mis en cache d'un album
    pub async fn delete_cached_artwork(&self, album_id: &str) -> Result<()> {
        if let Some(path) = self.db.get_artwork(album_id)? {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(DownloadError::from_io(e));
                }
            }
            self.db.delete_artwork(album_id)?;
            debug!(album_id, "Album artwork deleted");
        }
        Ok(())
    }

    /// Espace disque occupé par les fichiers audio téléchargés
    pub async fn total_storage_used(&self) -> u64 {
        self.index.read().await.values().map(|t| t.file_size).sum()
    }

    /// Nombre d'albums ayant au moins une piste locale
    pub async fn downloaded_album_count(&self) -> usize {
        let index = self.index.read().await;
        let albums: std::collections::HashSet<&str> =
            index.values().map(|t| t.album_id.as_str()).collect();
        albums.len()
    }

    /// Nombre de pistes locales
    pub async fn downloaded_track_count(&self) -> usize {
        self.index.read().await.len()
    }

    /// Albums téléchargés, triés par nom, pistes par numéro
    pub async fn downloaded_albums(&self) -> Vec<DownloadedAlbum> {
        let index = self.index.read().await;
        let mut by_album: HashMap<&str, DownloadedAlbum> = HashMap::new();

        for track in index.values() {
            by_album
                .entry(track.album_id.as_str())
                .or_insert_with(|| DownloadedAlbum {
                    album_id: track.album_id.clone(),
                    album_name: track.album_name.clone(),
                    artist_name: track.artist_name.clone(),
                    tracks: Vec::new(),
                })
                .tracks
                .push(track.clone());
        }

        let mut albums: Vec<DownloadedAlbum> = by_album.into_values().collect();
        for album in &mut albums {
            album.tracks.sort_by_key(|t| t.track_number);
        }
        albums.sort_by(|a, b| a.album_name.cmp(&b.album_name));
        albums
    }

    /// Pistes locales d'un album, triées par numéro de piste
    pub async fn downloaded_tracks(&self, album_id: &str) -> Vec<DownloadedTrack> {
        let index = self.index.read().await;
        let mut tracks: Vec<DownloadedTrack> = index
            .values()
            .filter(|t| t.album_id == album_id)
            .cloned()
            .collect();
        tracks.sort_by_key(|t| t.track_number);
        tracks
    }

    /// Réconcilie l'index avec le contenu réel du disque
    ///
    /// Deux passes, comme pour tout stockage adossé à un index :
    /// 1. les entrées d'index dont le fichier a disparu sont retirées ;
    /// 2. les fichiers du répertoire audio sans entrée (orphelins et
    ///    `.part` laissés par un crash) sont supprimés.
    /// L'artwork suit la même règle vis-à-vis de la table
    /// `album_artwork` et des albums restants.
    pub async fn reconcile(&self) -> Result<()> {
        let mut dropped_entries = 0u32;
        let mut removed_files = 0u32;

        // Passe 1 : entrées sans fichier
        let tracks: Vec<DownloadedTrack> = self.index.read().await.values().cloned().collect();
        for track in tracks {
            if !track.file_path.exists() {
                warn!(
                    track_id = %track.track_id,
                    path = %track.file_path.display(),
                    "Indexed file missing, dropping entry"
                );
                self.db.delete(&track.track_id)?;
                self.index.write().await.remove(&track.track_id);
                self.states.write().await.remove(&track.track_id);
                dropped_entries += 1;
            }
        }

        // Passe 2 : fichiers sans entrée
        let expected: std::collections::HashSet<PathBuf> = self
            .index
            .read()
            .await
            .values()
            .map(|t| t.file_path.clone())
            .collect();

        let mut entries = tokio::fs::read_dir(&self.audio_dir)
            .await
            .map_err(DownloadError::from_io)?;
        while let Some(entry) = entries.next_entry().await.map_err(DownloadError::from_io)? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_partial = path
                .to_string_lossy()
                .ends_with(".part");
            if is_partial || !expected.contains(&path) {
                debug!(path = %path.display(), "Removing stray file");
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "Failed to remove stray file");
                } else {
                    removed_files += 1;
                }
            }
        }

        // Artwork : lignes sans fichier ou sans album, fichiers sans ligne
        let mut indexed_artwork: std::collections::HashSet<PathBuf> =
            std::collections::HashSet::new();
        for (album_id, path) in self.db.get_all_artwork()? {
            let album_present = self
                .index
                .read()
                .await
                .values()
                .any(|t| t.album_id == album_id);
            if !album_present || !path.exists() {
                let _ = tokio::fs::remove_file(&path).await;
                self.db.delete_artwork(&album_id)?;
            } else {
                indexed_artwork.insert(path);
            }
        }

        let mut entries = tokio::fs::read_dir(&self.artwork_dir)
            .await
            .map_err(DownloadError::from_io)?;
        while let Some(entry) = entries.next_entry().await.map_err(DownloadError::from_io)? {
            let path = entry.path();
            if path.is_file() && !indexed_artwork.contains(&path) {
                debug!(path = %path.display(), "Removing stray artwork");
                let _ = tokio::fs::remove_file(&path).await;
            }
        }

        info!(dropped_entries, removed_files, "Reconciliation completed");
        Ok(())
    }
}

impl std::fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadManager")
            .field("audio_dir", &self.audio_dir)
            .field("artwork_dir", &self.artwork_dir)
            .finish()
    }
}
