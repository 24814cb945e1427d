//! Initialisation du logging de l'application
//!
//! Le niveau minimum et la sortie console viennent de la configuration
//! (`host.logger`). Le filtre accepte aussi les directives `RUST_LOG`
//! habituelles via la syntaxe d'EnvFilter.

use crate::get_config;
use tracing_subscriber::EnvFilter;

/// Initialise le subscriber tracing global depuis la configuration
///
/// No-op si un subscriber est déjà installé (utile dans les tests).
pub fn init_logging() {
    let config = get_config();

    let min_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "INFO".to_string())
        .to_lowercase();
    let filter = EnvFilter::try_new(&min_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.get_log_enable_console() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .try_init();
    }
}
