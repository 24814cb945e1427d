//! Cache de couvertures à deux tiers (mémoire + disque)
//!
//! Résout une URL d'artwork en bitmap décodé, en minimisant les
//! récupérations réseau redondantes et en survivant aux redémarrages
//! grâce au tier disque. Les ratés concurrents pour une même URL sont
//! coalescés en une seule requête réseau.

use crate::error::{CoverError, Result};
use crate::memory::{MemoryBudget, MemoryTier};
use jtfetch::MediaFetcher;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, broadcast};

/// Résultat partagé entre appelants coalescés
///
/// L'erreur circule en tant que chaîne car les erreurs concrètes ne
/// sont pas clonables ; seuls les suiveurs la reçoivent sous cette forme.
type SharedOutcome = std::result::Result<Arc<CoverImage>, String>;

/// Image de couverture décodée, possédée par le cache
///
/// Les consommateurs reçoivent des `Arc<CoverImage>` partagés ; le coût
/// mémoire comptabilisé est celui du bitmap décodé.
pub struct CoverImage {
    image: image::DynamicImage,
    source_len: usize,
}

impl CoverImage {
    /// Décode une image depuis ses octets source
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| CoverError::Decode(e.to_string()))?;
        Ok(Self {
            image,
            source_len: bytes.len(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_decoded(image: image::DynamicImage, source_len: usize) -> Self {
        Self { image, source_len }
    }

    /// Bitmap décodé
    pub fn image(&self) -> &image::DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Taille des octets source (format d'origine)
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Coût mémoire du bitmap décodé (RGBA)
    pub fn byte_cost(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height()) * 4
    }
}

impl std::fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("source_len", &self.source_len)
            .finish()
    }
}

/// Calcule la clé disque d'une URL (SHA256 hexadécimal)
///
/// Deux processus calculent le même chemin pour la même URL, ce qui
/// rend le tier disque partageable sans index.
pub fn pk_from_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache de couvertures
///
/// Note : ce type est conçu pour être construit une fois au démarrage
/// et partagé derrière un `Arc`. Le fetcher est injecté à la
/// construction ; aucun état global caché.
pub struct CoverCache {
    /// Répertoire du tier disque
    dir: PathBuf,
    /// Frontière réseau injectée
    fetcher: Arc<dyn MediaFetcher>,
    /// Tier mémoire LRU
    memory: StdMutex<MemoryTier>,
    /// Map des récupérations en cours (url -> canal de diffusion)
    inflight: Mutex<HashMap<String, broadcast::Sender<SharedOutcome>>>,
}

impl CoverCache {
    /// Crée un nouveau cache de couvertures
    ///
    /// # Arguments
    ///
    /// * `dir` - Répertoire de stockage du tier disque
    /// * `budget` - Budget du tier mémoire
    /// * `fetcher` - Accès réseau injecté
    pub fn new(
        dir: impl AsRef<Path>,
        budget: MemoryBudget,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            fetcher,
            memory: StdMutex::new(MemoryTier::new(budget)),
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// Retourne le répertoire du tier disque
    pub fn cache_dir(&self) -> &Path {
        &self.dir
    }

    /// Chemin disque déterministe d'une URL
    ///
    /// Format: `{sha256(url)}.img`
    pub fn disk_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.img", pk_from_url(url)))
    }

    /// Recherche non bloquante : mémoire puis disque, jamais le réseau
    ///
    /// Un hit mémoire rafraîchit la récence ; un hit disque décode de
    /// façon synchrone et repeuple le tier mémoire. Un fichier disque
    /// corrompu est supprimé et traité comme un raté.
    ///
    /// # Arguments
    ///
    /// * `url` - URL canonique de la couverture
    pub fn cached_image(&self, url: &str) -> Option<Arc<CoverImage>> {
        if let Some(image) = self.memory.lock().unwrap().get(url) {
            tracing::trace!(url, "Cover memory hit");
            return Some(image);
        }

        let path = self.disk_path(url);
        let bytes = std::fs::read(&path).ok()?;

        match CoverImage::decode(&bytes) {
            Ok(image) => {
                tracing::debug!(url, "Cover disk hit");
                let image = Arc::new(image);
                self.memory.lock().unwrap().insert(url, image.clone());
                Some(image)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Corrupt cover on disk, discarding");
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Résout une couverture, avec repli réseau sur raté complet
    ///
    /// Les appels concurrents pour la même URL sont coalescés : un seul
    /// télécharge, tous observent le même résultat terminal. Un succès
    /// écrit les deux tiers avant de retourner ; un échec n'est jamais
    /// mis en cache.
    ///
    /// # Arguments
    ///
    /// * `url` - URL canonique de la couverture
    pub async fn load_image(&self, url: &str) -> Result<Arc<CoverImage>> {
        if let Some(image) = self.cached_image(url) {
            return Ok(image);
        }

        // Rejoindre un téléchargement en cours ou devenir leader
        let mut follower = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(url) {
                Some(tx) => Some(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    inflight.insert(url.to_string(), tx);
                    None
                }
            }
        };

        if let Some(rx) = follower.as_mut() {
            tracing::debug!(url, "Joining in-flight cover fetch");
            return match rx.recv().await {
                Ok(Ok(image)) => Ok(image),
                Ok(Err(message)) => Err(CoverError::Shared(message)),
                Err(_) => Err(CoverError::Shared("in-flight fetch dropped".to_string())),
            };
        }

        // Leader : récupérer, stocker, puis publier aux suiveurs
        let outcome = self.fetch_and_store(url).await;
        let shared: SharedOutcome = match &outcome {
            Ok(image) => Ok(image.clone()),
            Err(e) => Err(e.to_string()),
        };

        {
            let mut inflight = self.inflight.lock().await;
            if let Some(tx) = inflight.remove(url) {
                // Personne n'écoute si aucun appel concurrent : ignoré
                let _ = tx.send(shared);
            }
        }

        outcome
    }

    /// Télécharge, décode et peuple les deux tiers
    async fn fetch_and_store(&self, url: &str) -> Result<Arc<CoverImage>> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let image = Arc::new(CoverImage::decode(&bytes)?);

        tokio::fs::write(self.disk_path(url), &bytes).await?;

        let evicted = self.memory.lock().unwrap().insert(url, image.clone());
        tracing::debug!(
            url,
            bytes = bytes.len(),
            evicted,
            "Cover fetched and cached"
        );

        Ok(image)
    }

    /// Supprime une couverture des deux tiers
    ///
    /// Appelé par la couche téléchargements quand l'élément propriétaire
    /// disparaît. No-op si l'URL n'est pas en cache.
    pub fn remove(&self, url: &str) -> Result<()> {
        self.memory.lock().unwrap().remove(url);

        if let Err(err) = std::fs::remove_file(self.disk_path(url)) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Vide les deux tiers (opération « vider le cache d'images »)
    pub async fn purge(&self) -> Result<()> {
        self.memory.lock().unwrap().clear();

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "img") {
                tokio::fs::remove_file(&path).await?;
            }
        }

        tracing::info!(dir = %self.dir.display(), "Cover cache purged");
        Ok(())
    }

    /// Nombre d'entrées du tier mémoire
    pub fn memory_len(&self) -> usize {
        self.memory.lock().unwrap().len()
    }

    /// Octets décodés actuellement retenus par le tier mémoire
    pub fn memory_bytes(&self) -> u64 {
        self.memory.lock().unwrap().total_bytes()
    }
}
