//! Extension pour intégrer le gestionnaire de téléchargements dans jtconfig
//!
//! Ce module fournit le trait `DownloadsConfigExt` qui ajoute à
//! `jtconfig::Config` les accesseurs et la factory du gestionnaire.

use crate::manager::DownloadManager;
use anyhow::Result;
use jtconfig::Config;
use jtfetch::MediaFetcher;
use std::sync::Arc;

const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Trait d'extension pour gérer les téléchargements dans jtconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use jtconfig::get_config;
/// use jtdownloads::DownloadsConfigExt;
/// use jtfetch::HttpFetcher;
/// use std::sync::Arc;
///
/// let config = get_config();
/// let fetcher = Arc::new(HttpFetcher::new()?);
/// let manager = config.create_download_manager(fetcher)?;
/// ```
pub trait DownloadsConfigExt {
    /// Récupère le répertoire racine des téléchargements
    ///
    /// # Returns
    ///
    /// Le chemin absolu du répertoire (default: "downloads"), créé si absent
    fn get_downloads_dir(&self) -> Result<String>;

    /// Définit le répertoire racine des téléchargements
    ///
    /// # Arguments
    ///
    /// * `directory` - Chemin du répertoire (absolu ou relatif au config_dir)
    fn set_downloads_dir(&self, directory: String) -> Result<()>;

    /// Crée un gestionnaire de téléchargements configuré
    ///
    /// La réconciliation démarre en arrière-plan ; doit être appelé
    /// depuis un runtime tokio.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Accès réseau injecté dans le gestionnaire
    fn create_download_manager(
        &self,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Arc<DownloadManager>>;
}

impl DownloadsConfigExt for Config {
    fn get_downloads_dir(&self) -> Result<String> {
        self.get_cache_dir("downloads", DEFAULT_DOWNLOADS_DIR)
    }

    fn set_downloads_dir(&self, directory: String) -> Result<()> {
        self.set_cache_dir("downloads", directory)
    }

    fn create_download_manager(
        &self,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Arc<DownloadManager>> {
        let dir = self.get_downloads_dir()?;
        let max_parallel = self.get_max_parallel_downloads();
        Ok(DownloadManager::new_with_reconciliation(
            &dir,
            fetcher,
            max_parallel,
        )?)
    }
}
