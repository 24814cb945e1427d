//! # jtconfig - Configuration de JellyTone
//!
//! Cette crate gère la configuration de l'application :
//! - Chargement depuis un fichier YAML
//! - Fusion avec la configuration par défaut intégrée
//! - Surcharges par variables d'environnement
//! - Getters/setters typés avec valeurs par défaut
//! - Accès singleton thread-safe
//!
//! ## Utilisation
//!
//! ```no_run
//! use jtconfig::get_config;
//!
//! let config = get_config();
//! let downloads_dir = config.get_cache_dir("downloads", "downloads")?;
//! let parallel = config.get_max_parallel_downloads();
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

pub mod logging;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("jellytone.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load JellyTone configuration"));
}

const ENV_CONFIG_DIR: &str = "JELLYTONE_CONFIG";
const ENV_PREFIX: &str = "JELLYTONE_CONFIG__";

// Valeurs par défaut
const DEFAULT_MAX_PARALLEL_DOWNLOADS: usize = 3;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Macro générant getter/setter pour une valeur usize avec défaut
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path)? {
                Value::Number(n) if n.is_i64() => Ok(n.as_i64().unwrap() as usize),
                Value::Number(n) if n.is_u64() => Ok(n.as_u64().unwrap() as usize),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Gestionnaire de configuration de JellyTone
///
/// Le document YAML fusionné est conservé derrière un Mutex ; chaque
/// mutation est immédiatement persistée dans config.yaml.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Cherche le répertoire de configuration en essayant plusieurs emplacements
    fn find_config_dir(directory: &str) -> String {
        // 1. Répertoire fourni explicitement
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Variable d'environnement
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Répertoire courant
        if Path::new(".jellytone").exists() {
            return ".jellytone".to_string();
        }

        // 4. Répertoire home
        if let Some(home) = home_dir() {
            let home_config = home.join(".jellytone");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".jellytone".to_string()
    }

    /// Valide et prépare un répertoire de configuration
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Vérifier les permissions d'écriture
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;
        fs::read_dir(path)?;

        Ok(())
    }

    /// Détermine et valide le répertoire de configuration
    ///
    /// Ordre de recherche :
    /// 1. Le paramètre `directory` s'il n'est pas vide
    /// 2. La variable d'environnement `JELLYTONE_CONFIG`
    /// 3. `.jellytone` dans le répertoire courant
    /// 4. `.jellytone` dans le répertoire home
    ///
    /// # Panics
    ///
    /// Panique si le répertoire ne peut pas être créé ou validé
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
    }

    /// Charge la configuration depuis le répertoire spécifié
    ///
    /// # Arguments
    ///
    /// * `directory` - Répertoire contenant config.yaml, ou vide pour la recherche par défaut
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration externe
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Fusionner avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les surcharges d'environnement
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Sauvegarde la configuration courante dans config.yaml
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Définit une valeur au chemin spécifié et la persiste
    ///
    /// # Arguments
    ///
    /// * `path` - Tableau de clés représentant le chemin (ex: `&["server", "url"]`)
    /// * `value` - Valeur YAML à définir
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Récupère une valeur au chemin spécifié
    ///
    /// # Arguments
    ///
    /// * `path` - Tableau de clés représentant le chemin (ex: `&["server", "url"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        new_map.insert(new_key, Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Résout un chemin relatif ou absolu et crée le répertoire si nécessaire
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            // Chemin relatif : le résoudre par rapport à config_dir
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created cache directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    /// Récupère le répertoire d'un cache géré par la configuration
    ///
    /// Le répertoire peut être absolu ou relatif au répertoire de
    /// configuration ; il est créé s'il n'existe pas.
    ///
    /// # Arguments
    ///
    /// * `key` - Clé du cache sous `host` (ex: `"cover_cache"`, `"downloads"`)
    /// * `default` - Nom de répertoire par défaut si non configuré
    pub fn get_cache_dir(&self, key: &str, default: &str) -> Result<String> {
        let path = &["host", key, "directory"];
        let dir_path = match self.get_value(path) {
            Ok(Value::String(s)) => s,
            _ => {
                self.set_value(path, Value::String(default.to_string()))?;
                default.to_string()
            }
        };
        self.resolve_and_create_dir(&dir_path)
    }

    /// Définit le répertoire d'un cache géré par la configuration
    ///
    /// # Arguments
    ///
    /// * `key` - Clé du cache sous `host`
    /// * `directory` - Chemin du répertoire (absolu ou relatif au config_dir)
    pub fn set_cache_dir(&self, key: &str, directory: String) -> Result<()> {
        self.set_value(&["host", key, "directory"], Value::String(directory))
    }

    /// Récupère la taille limite d'un cache
    ///
    /// # Arguments
    ///
    /// * `key` - Clé du cache sous `host`
    /// * `default` - Valeur par défaut si non configurée
    pub fn get_cache_size(&self, key: &str, default: usize) -> Result<usize> {
        match self.get_value(&["host", key, "size"]) {
            Ok(Value::Number(n)) if n.is_u64() => Ok(n.as_u64().unwrap() as usize),
            Ok(Value::Number(n)) if n.is_i64() => Ok(n.as_i64().unwrap() as usize),
            _ => Ok(default),
        }
    }

    /// Définit la taille limite d'un cache
    pub fn set_cache_size(&self, key: &str, size: usize) -> Result<()> {
        let n = Number::from(size);
        self.set_value(&["host", key, "size"], Value::Number(n))
    }

    /// Récupère l'URL du serveur Jellyfin
    ///
    /// # Returns
    ///
    /// L'URL configurée, ou une chaîne vide si absente (onboarding non fait)
    pub fn get_server_url(&self) -> String {
        match self.get_value(&["server", "url"]) {
            Ok(Value::String(s)) => s,
            _ => String::new(),
        }
    }

    /// Définit l'URL du serveur Jellyfin
    pub fn set_server_url(&self, url: String) -> Result<()> {
        self.set_value(&["server", "url"], Value::String(url))
    }

    /// Récupère la clé d'API du serveur
    pub fn get_api_key(&self) -> String {
        match self.get_value(&["server", "api_key"]) {
            Ok(Value::String(s)) => s,
            _ => String::new(),
        }
    }

    /// Définit la clé d'API du serveur
    pub fn set_api_key(&self, key: String) -> Result<()> {
        self.set_value(&["server", "api_key"], Value::String(key))
    }

    /// Récupère le nombre maximal de téléchargements simultanés
    pub fn get_max_parallel_downloads(&self) -> usize {
        match self.get_value(&["host", "downloads", "max_parallel"]) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(count) => (count as usize).max(1),
                None => DEFAULT_MAX_PARALLEL_DOWNLOADS,
            },
            _ => DEFAULT_MAX_PARALLEL_DOWNLOADS,
        }
    }

    /// Définit le nombre maximal de téléchargements simultanés
    pub fn set_max_parallel_downloads(&self, count: usize) -> Result<()> {
        let n = Number::from(count);
        self.set_value(&["host", "downloads", "max_parallel"], Value::Number(n))
    }

    /// Récupère le niveau de log minimum
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"])? {
            Value::String(s) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    /// Définit le niveau de log minimum
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }

    /// Indique si les logs doivent être émis sur la console
    pub fn get_log_enable_console(&self) -> bool {
        match self.get_value(&["host", "logger", "enable_console"]) {
            Ok(Value::Bool(b)) => b,
            _ => true,
        }
    }

    /// Active ou désactive les logs console
    pub fn set_log_enable_console(&self, enable: bool) -> Result<()> {
        self.set_value(&["host", "logger", "enable_console"], Value::Bool(enable))
    }

    impl_usize_config!(
        get_cover_memory_budget_bytes,
        set_cover_memory_budget_bytes,
        &["host", "cover_cache", "memory_budget_bytes"],
        64 * 1024 * 1024
    );

    impl_usize_config!(
        get_cover_memory_budget_entries,
        set_cover_memory_budget_entries,
        &["host", "cover_cache", "memory_budget_entries"],
        256
    );
}

/// Retourne l'instance de configuration globale
///
/// L'instance est chargée paresseusement au premier accès.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Fusionne la configuration externe dans la configuration par défaut
///
/// Fusion récursive : pour les mappings les clés externes sont fusionnées,
/// pour les scalaires et séquences la valeur externe remplace la valeur
/// par défaut.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_load_writes_config_file() {
        let (dir, _config) = test_config();
        assert!(dir.path().join("config.yaml").exists());
    }

    #[test]
    fn test_default_values() {
        let (_dir, config) = test_config();
        assert_eq!(config.get_max_parallel_downloads(), 3);
        assert_eq!(config.get_server_url(), "");
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
    }

    #[test]
    fn test_set_and_get_value() {
        let (_dir, config) = test_config();
        config
            .set_server_url("http://media.local:8096".to_string())
            .unwrap();
        assert_eq!(config.get_server_url(), "http://media.local:8096");
    }

    #[test]
    fn test_cache_dir_created_relative_to_config() {
        let (dir, config) = test_config();
        let cache_dir = config.get_cache_dir("cover_cache", "cache_covers").unwrap();
        assert!(Path::new(&cache_dir).is_dir());
        assert!(cache_dir.starts_with(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_keys_are_lowercased() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "Server:\n  URL: http://example.org\n",
        )
        .unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_server_url(), "http://example.org");
    }

    #[test]
    fn test_cache_size_roundtrip() {
        let (_dir, config) = test_config();
        assert_eq!(config.get_cache_size("downloads", 500).unwrap(), 500);
        config.set_cache_size("downloads", 42).unwrap();
        assert_eq!(config.get_cache_size("downloads", 500).unwrap(), 42);
    }
}
