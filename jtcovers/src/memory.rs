//! Tier mémoire du cache de couvertures
//!
//! LRU strict borné par un budget d'octets et un nombre d'entrées.
//! Le coût d'une image est celui de son bitmap décodé (largeur ×
//! hauteur × 4), pas celui des octets source.

use crate::cache::CoverImage;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Budget du tier mémoire
#[derive(Debug, Clone, Copy)]
pub struct MemoryBudget {
    /// Budget en octets de bitmaps décodés
    pub max_bytes: u64,
    /// Nombre maximal d'entrées
    pub max_entries: usize,
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            max_entries: 256,
        }
    }
}

/// Tier mémoire LRU
///
/// L'ordre de récence est maintenu dans une deque : tête = moins
/// récemment utilisé, queue = plus récemment utilisé. Les accès et
/// insertions rafraîchissent la récence.
pub(crate) struct MemoryTier {
    budget: MemoryBudget,
    entries: HashMap<String, Arc<CoverImage>>,
    order: VecDeque<String>,
    total_bytes: u64,
}

impl MemoryTier {
    pub fn new(budget: MemoryBudget) -> Self {
        Self {
            budget,
            entries: HashMap::new(),
            order: VecDeque::new(),
            total_bytes: 0,
        }
    }

    /// Recherche une entrée et rafraîchit sa récence
    pub fn get(&mut self, key: &str) -> Option<Arc<CoverImage>> {
        let image = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(image)
    }

    /// Insère une entrée puis applique le budget
    ///
    /// # Returns
    ///
    /// Le nombre d'entrées évincées
    pub fn insert(&mut self, key: &str, image: Arc<CoverImage>) -> usize {
        if let Some(previous) = self.entries.insert(key.to_string(), image.clone()) {
            self.total_bytes -= previous.byte_cost();
            self.touch(key);
        } else {
            self.order.push_back(key.to_string());
        }
        self.total_bytes += image.byte_cost();

        self.enforce_budget()
    }

    /// Supprime une entrée si présente
    pub fn remove(&mut self, key: &str) {
        if let Some(image) = self.entries.remove(key) {
            self.total_bytes -= image.byte_cost();
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
        }
    }

    /// Vide le tier
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.total_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Déplace une clé en queue de l'ordre de récence
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
            self.order.push_back(key.to_string());
        }
    }

    /// Évince les entrées les moins récentes jusqu'à respecter le budget
    ///
    /// L'entrée la plus récente n'est jamais évincée, même si elle
    /// dépasse à elle seule le budget en octets.
    fn enforce_budget(&mut self) -> usize {
        let mut evicted = 0;
        while self.len() > 1
            && (self.total_bytes > self.budget.max_bytes || self.len() > self.budget.max_entries)
        {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(image) = self.entries.remove(&oldest) {
                self.total_bytes -= image.byte_cost();
                evicted += 1;
                tracing::debug!(key = %oldest, "Evicted cover from memory tier");
            }
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> Arc<CoverImage> {
        let img = image::DynamicImage::new_rgba8(width, height);
        Arc::new(CoverImage::from_decoded(img, 0))
    }

    fn small_budget() -> MemoryBudget {
        MemoryBudget {
            max_bytes: 1024 * 1024,
            max_entries: 2,
        }
    }

    #[test]
    fn test_lru_order_on_entry_budget() {
        let mut tier = MemoryTier::new(small_budget());
        tier.insert("a", test_image(10, 10));
        tier.insert("b", test_image(10, 10));

        // Toucher "a" pour en faire l'entrée la plus récente
        assert!(tier.get("a").is_some());

        let evicted = tier.insert("c", test_image(10, 10));
        assert_eq!(evicted, 1);
        assert!(tier.get("b").is_none());
        assert!(tier.get("a").is_some());
        assert!(tier.get("c").is_some());
    }

    #[test]
    fn test_byte_budget_eviction() {
        let budget = MemoryBudget {
            max_bytes: 90_000,
            max_entries: 100,
        };
        let mut tier = MemoryTier::new(budget);

        // 100x100 RGBA = 40 000 octets par image
        tier.insert("a", test_image(100, 100));
        tier.insert("b", test_image(100, 100));
        tier.insert("c", test_image(100, 100));

        assert_eq!(tier.len(), 2);
        assert!(tier.total_bytes() <= 90_000);
        assert!(tier.get("a").is_none());
    }

    #[test]
    fn test_newest_entry_never_evicted() {
        let budget = MemoryBudget {
            max_bytes: 1,
            max_entries: 10,
        };
        let mut tier = MemoryTier::new(budget);
        tier.insert("big", test_image(100, 100));
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_reinsert_updates_cost() {
        let mut tier = MemoryTier::new(small_budget());
        tier.insert("a", test_image(10, 10));
        let before = tier.total_bytes();
        tier.insert("a", test_image(20, 20));
        assert_eq!(tier.len(), 1);
        assert!(tier.total_bytes() > before);
    }
}
