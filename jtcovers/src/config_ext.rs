//! Extension pour intégrer le cache de couvertures dans jtconfig
//!
//! Ce module fournit le trait `CoverCacheConfigExt` qui ajoute à
//! `jtconfig::Config` les accesseurs et la factory du cache de couvertures.

use crate::cache::CoverCache;
use crate::memory::MemoryBudget;
use anyhow::Result;
use jtconfig::Config;
use jtfetch::MediaFetcher;
use std::sync::Arc;

const DEFAULT_COVER_CACHE_DIR: &str = "cache_covers";

/// Trait d'extension pour gérer le cache de couvertures dans jtconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use jtconfig::get_config;
/// use jtcovers::CoverCacheConfigExt;
/// use jtfetch::HttpFetcher;
/// use std::sync::Arc;
///
/// let config = get_config();
/// let fetcher = Arc::new(HttpFetcher::new()?);
/// let cache = config.create_cover_cache(fetcher)?;
/// ```
pub trait CoverCacheConfigExt {
    /// Récupère le répertoire du cache de couvertures
    ///
    /// # Returns
    ///
    /// Le chemin absolu du répertoire (default: "cache_covers"), créé si absent
    fn get_covers_dir(&self) -> Result<String>;

    /// Définit le répertoire du cache de couvertures
    ///
    /// # Arguments
    ///
    /// * `directory` - Chemin du répertoire (absolu ou relatif au config_dir)
    fn set_covers_dir(&self, directory: String) -> Result<()>;

    /// Récupère le budget du tier mémoire configuré
    fn get_covers_memory_budget(&self) -> Result<MemoryBudget>;

    /// Crée une instance du cache de couvertures configurée
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Accès réseau injecté dans le cache
    fn create_cover_cache(&self, fetcher: Arc<dyn MediaFetcher>) -> Result<Arc<CoverCache>>;
}

impl CoverCacheConfigExt for Config {
    fn get_covers_dir(&self) -> Result<String> {
        self.get_cache_dir("cover_cache", DEFAULT_COVER_CACHE_DIR)
    }

    fn set_covers_dir(&self, directory: String) -> Result<()> {
        self.set_cache_dir("cover_cache", directory)
    }

    fn get_covers_memory_budget(&self) -> Result<MemoryBudget> {
        Ok(MemoryBudget {
            max_bytes: self.get_cover_memory_budget_bytes()? as u64,
            max_entries: self.get_cover_memory_budget_entries()?,
        })
    }

    fn create_cover_cache(&self, fetcher: Arc<dyn MediaFetcher>) -> Result<Arc<CoverCache>> {
        let dir = self.get_covers_dir()?;
        let budget = self.get_covers_memory_budget()?;
        Ok(Arc::new(CoverCache::new(&dir, budget, fetcher)?))
    }
}
