//! Accès HTTP à la source média
//!
//! Ce module définit le trait `MediaFetcher`, la seule vue que le cœur
//! hors-ligne a du serveur Jellyfin : `GET bytes(url)`, en mode bufferisé
//! ou en flux. L'implémentation `HttpFetcher` s'appuie sur reqwest.

use crate::error::{FetchError, Result};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;

/// Flux de chunks retourné par un téléchargement en streaming
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Résultat d'un téléchargement en streaming
///
/// La taille attendue provient de l'en-tête `Content-Length` si le
/// serveur l'annonce ; elle sert au calcul de progression côté appelant.
pub struct FetchStream {
    /// Taille attendue du corps (si annoncée)
    pub expected_len: Option<u64>,
    /// Flux de chunks
    pub stream: ByteStream,
}

/// Frontière d'accès à la source média
///
/// Les caches reçoivent une instance injectée à la construction, ce qui
/// permet de substituer une implémentation factice dans les tests.
#[async_trait::async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Récupère une ressource entière en mémoire
    ///
    /// # Arguments
    ///
    /// * `url` - URL de la ressource à récupérer
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes>;

    /// Récupère une ressource sous forme de flux de chunks
    ///
    /// À utiliser pour les corps volumineux (pistes audio) afin d'écrire
    /// sur disque au fil de l'eau sans tout charger en mémoire.
    ///
    /// # Arguments
    ///
    /// * `url` - URL de la ressource à récupérer
    async fn fetch_stream(&self, url: &str) -> Result<FetchStream>;
}

/// Implémentation reqwest de `MediaFetcher`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Crée un fetcher avec un timeout de 300 secondes
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self { client })
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, code = status.as_u16(), "Non-success HTTP status");
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.get_checked(url).await?;
        Ok(response.bytes().await?)
    }

    async fn fetch_stream(&self, url: &str) -> Result<FetchStream> {
        let response = self.get_checked(url).await?;
        let expected_len = response.content_length();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FetchError::Network));

        Ok(FetchStream {
            expected_len,
            stream: Box::pin(stream),
        })
    }
}
