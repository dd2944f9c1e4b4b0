// ============================================================================
// Surface clé-valeur durable
// ============================================================================
// Équivalent terminal du localStorage d'un navigateur : des chaînes
// indexées par une clé fixe
//
// CONCEPTS RUST :
// 1. Trait objet (Box<dyn KeyValueStore>) : backend injecté, testable
// 2. Arc<Mutex<...>> : état partagé entre clones du store mémoire
// 3. Écriture atomique : fichier temporaire puis rename
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::PersistenceError;

/// Stockage durable de chaînes, indexé par clé
pub trait KeyValueStore: Send {
    /// Lit une valeur, None si la clé n'existe pas
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Écrase la valeur associée à la clé
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

// ============================================================================
// Backend fichier
// ============================================================================

/// Un fichier par clé dans un répertoire de données
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "No persisted value");
                Ok(None)
            }
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // CONCEPT : Écriture atomique
        // - On écrit dans un fichier .tmp puis on le renomme
        // - Un crash en pleine écriture ne laisse jamais un JSON tronqué
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value).map_err(|source| PersistenceError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(?path, bytes = value.len(), "Persisted value");
        Ok(())
    }
}

// ============================================================================
// Backend mémoire
// ============================================================================

/// Store en mémoire, utilisé par les tests et en secours sans disque
///
/// Les clones partagent les mêmes entrées.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée un store avec une valeur préexistante
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
