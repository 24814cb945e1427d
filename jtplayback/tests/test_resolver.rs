use bytes::Bytes;
use jtdownloads::{DownloadManager, TrackDescriptor};
use jtfetch::{FetchError, FetchStream, MediaFetcher};
use jtplayback::{PlaybackSource, RemoteSource, SourceResolver};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

/// Fetcher factice servant des payloads en mémoire
struct FakeFetcher {
    payloads: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            payloads: Mutex::new(HashMap::new()),
        }
    }

    fn serve(&self, url: &str, payload: Vec<u8>) {
        self.payloads
            .lock()
            .unwrap()
            .insert(url.to_string(), payload);
    }
}

#[async_trait::async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
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

/// Client réseau factice fournissant les URLs de streaming
struct FakeRemote;

impl RemoteSource for FakeRemote {
    fn stream_url(&self, track_id: &str) -> String {
        format!("http://server/Audio/{}/stream", track_id)
    }
}

fn track(track_id: &str) -> TrackDescriptor {
    TrackDescriptor {
        track_id: track_id.to_string(),
        album_id: "a1".to_string(),
        album_name: "Album".to_string(),
        artist_name: "Artist".to_string(),
        track_name: track_id.to_string(),
        track_number: 1,
        duration_secs: 180.0,
        container: "flac".to_string(),
        stream_url: format!("http://server/Audio/{}/stream", track_id),
        artwork_url: None,
    }
}

#[tokio::test]
async fn test_resolves_remote_when_not_downloaded() {
    let fetcher = Arc::new(FakeFetcher::new());
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(DownloadManager::new(temp_dir.path(), fetcher, 3).unwrap());
    let resolver = SourceResolver::new(manager, Arc::new(FakeRemote));

    let source = resolver.resolve("t1").await;
    assert_eq!(
        source,
        PlaybackSource::Remote("http://server/Audio/t1/stream".to_string())
    );
}

#[tokio::test]
async fn test_prefers_local_once_downloaded() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve("http://server/Audio/t1/stream", vec![1u8; 256]);
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(DownloadManager::new(temp_dir.path(), fetcher.clone(), 3).unwrap());
    let resolver = SourceResolver::new(manager.clone(), Arc::new(FakeRemote));

    // Avant le téléchargement : flux réseau
    assert!(!resolver.resolve("t1").await.is_local());

    manager.download_track(track("t1")).await;
    manager.wait_until_settled("t1").await;

    // La résolution suivante préfère le fichier local
    let source = resolver.resolve("t1").await;
    match source {
        PlaybackSource::Local(path) => assert!(path.exists()),
        other => panic!("expected local source, got {:?}", other),
    }
}

#[tokio::test]
async fn test_falls_back_to_remote_after_delete() {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.serve("http://server/Audio/t1/stream", vec![1u8; 256]);
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(DownloadManager::new(temp_dir.path(), fetcher.clone(), 3).unwrap());
    let resolver = SourceResolver::new(manager.clone(), Arc::new(FakeRemote));

    manager.download_track(track("t1")).await;
    manager.wait_until_settled("t1").await;
    assert!(resolver.resolve("t1").await.is_local());

    manager.delete_download("t1").await.unwrap();
    assert!(!resolver.resolve("t1").await.is_local());
}
