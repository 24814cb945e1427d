use bytes::Bytes;
use image::{ImageBuffer, Rgba};
use jtcovers::{CoverCache, MemoryBudget};
use jtfetch::{FetchError, FetchStream, MediaFetcher};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Fetcher factice servant des payloads en mémoire et comptant les requêtes
struct FakeFetcher {
    payloads: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
    delay: Duration,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            payloads: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    fn serve(&self, url: &str, payload: Vec<u8>) {
        self.payloads
            .lock()
            .unwrap()
            .insert(url.to_string(), payload);
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let payload = self.payloads.lock().unwrap().get(url).cloned();
        match payload {
            Some(bytes) => Ok(Bytes::from(bytes)),
            None => Err(FetchError::Status { code: 404 }),
        }
    }

    async fn fetch_stream(&self, url: &str) -> Result<FetchStream, FetchError> {
        let bytes = self.fetch_bytes(url).await?;
        let len = bytes.len() as u64;
        Ok(FetchStream {
            expected_len: Some(len),
            stream: Box::pin(futures_util::stream::iter(vec![Ok(bytes)])),
        })
    }
}

/// Crée une image PNG de test
fn create_test_image(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });

    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .unwrap();
    buffer
}

fn create_cache(fetcher: Arc<FakeFetcher>, budget: MemoryBudget) -> (TempDir, CoverCache) {
    let temp_dir = tempfile::tempdir().unwrap();
    let cache = CoverCache::new(temp_dir.path(), budget, fetcher).unwrap();
    (temp_dir, cache)
}

const URL: &str = "http://server/Items/42/Images/Primary";

#[tokio::test]
async fn test_miss_fetches_then_memory_hit() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve(URL, create_test_image(50, 50));
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    let cover = cache.load_image(URL).await.unwrap();
    assert_eq!(cover.width(), 50);
    assert_eq!(fetcher.fetch_count(), 1);

    // Second appel : hit mémoire, pas de nouvelle requête
    let again = cache.load_image(URL).await.unwrap();
    assert!(Arc::ptr_eq(&cover, &again));
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_cached_image_never_fetches() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve(URL, create_test_image(50, 50));
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    assert!(cache.cached_image(URL).is_none());
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_disk_tier_survives_restart() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve(URL, create_test_image(50, 50));
    let temp_dir = tempfile::tempdir().unwrap();

    {
        let cache =
            CoverCache::new(temp_dir.path(), MemoryBudget::default(), fetcher.clone()).unwrap();
        cache.load_image(URL).await.unwrap();
        assert!(cache.disk_path(URL).exists());
    }

    // Nouveau process simulé : tier mémoire vide, tier disque intact
    let restart_fetcher = Arc::new(FakeFetcher::new());
    let cache = CoverCache::new(
        temp_dir.path(),
        MemoryBudget::default(),
        restart_fetcher.clone(),
    )
    .unwrap();

    let cover = cache.cached_image(URL).unwrap();
    assert_eq!(cover.width(), 50);
    assert_eq!(restart_fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_concurrent_loads_are_deduplicated() {
    let fetcher = Arc::new(FakeFetcher::with_delay(Duration::from_millis(100)));
    fetcher.serve(URL, create_test_image(50, 50));
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());
    let cache = Arc::new(cache);

    let c1 = cache.clone();
    let c2 = cache.clone();
    let (a, b) = tokio::join!(c1.load_image(URL), c2.load_image(URL));

    let a = a.unwrap();
    let b = b.unwrap();

    // Une seule requête réseau, les deux appelants partagent le même bitmap
    assert_eq!(fetcher.fetch_count(), 1);
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let fetcher = Arc::new(FakeFetcher::new());
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    // Premier appel : 404
    assert!(cache.load_image(URL).await.is_err());
    assert_eq!(fetcher.fetch_count(), 1);
    assert!(!cache.disk_path(URL).exists());

    // La ressource apparaît : l'appel suivant retente le réseau
    fetcher.serve(URL, create_test_image(50, 50));
    let cover = cache.load_image(URL).await.unwrap();
    assert_eq!(cover.width(), 50);
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_decode_error_leaves_no_trace() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve(URL, b"this is not an image".to_vec());
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    let result = cache.load_image(URL).await;
    assert!(matches!(result, Err(jtcovers::CoverError::Decode(_))));
    assert!(!cache.disk_path(URL).exists());
    assert_eq!(cache.memory_len(), 0);
}

#[tokio::test]
async fn test_memory_eviction_keeps_disk_tier() {
    let fetcher = Arc::new(FakeFetcher::new());
    let budget = MemoryBudget {
        max_bytes: 1024 * 1024,
        max_entries: 2,
    };
    let (_dir, cache) = create_cache(fetcher.clone(), budget);

    let urls: Vec<String> = (0..3)
        .map(|i| format!("http://server/Items/{i}/Images/Primary"))
        .collect();
    for url in &urls {
        fetcher.serve(url, create_test_image(20, 20));
        cache.load_image(url).await.unwrap();
    }

    // Le tier mémoire respecte le budget, le tier disque garde tout
    assert_eq!(cache.memory_len(), 2);
    for url in &urls {
        assert!(cache.disk_path(url).exists());
    }

    // L'entrée évincée se recharge depuis le disque sans réseau
    let before = fetcher.fetch_count();
    assert!(cache.cached_image(&urls[0]).is_some());
    assert_eq!(fetcher.fetch_count(), before);
}

#[tokio::test]
async fn test_remove_drops_both_tiers() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve(URL, create_test_image(50, 50));
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    cache.load_image(URL).await.unwrap();
    cache.remove(URL).unwrap();

    assert!(!cache.disk_path(URL).exists());
    assert_eq!(cache.memory_len(), 0);

    // Supprimer une URL inconnue est un no-op
    cache.remove("http://server/Items/none").unwrap();
}

#[tokio::test]
async fn test_purge_clears_everything() {
    let fetcher = Arc::new(FakeFetcher::new());
    let (_dir, cache) = create_cache(fetcher.clone(), MemoryBudget::default());

    for i in 0..3 {
        let url = format!("http://server/Items/{i}/Images/Primary");
        fetcher.serve(&url, create_test_image(20, 20));
        cache.load_image(&url).await.unwrap();
    }

    cache.purge().await.unwrap();

    assert_eq!(cache.memory_len(), 0);
    assert_eq!(cache.memory_bytes(), 0);
    for i in 0..3 {
        let url = format!("http://server/Items/{i}/Images/Primary");
        assert!(!cache.disk_path(&url).exists());
    }
}
