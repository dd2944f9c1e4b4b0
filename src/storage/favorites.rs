// ============================================================================
// Favoris
// ============================================================================
// FavoriteSet : ensemble ordonné d'ids de coins (ordre d'insertion)
// FavoritesStore : chargement au démarrage + persistance après chaque toggle
//
// Format persisté : tableau JSON d'ids sous la clé "cryptoFavorites"
// Exemple : ["bitcoin","ethereum"]
// ============================================================================

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::storage::KeyValueStore;

/// Clé fixe des favoris dans la surface clé-valeur
pub const FAVORITES_KEY: &str = "cryptoFavorites";

/// Ensemble d'ids favoris, sans doublon, dans l'ordre d'insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: Vec<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit un ensemble en ignorant les doublons (première occurrence gardée)
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            let id = id.into();
            if !set.contains(&id) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|fav| fav == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    /// Retourne un nouvel ensemble avec l'id basculé
    ///
    /// CONCEPT : Transformation pure
    /// - Membre : retiré, les autres gardent leur ordre
    /// - Absent : ajouté à la fin
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(id);
        next
    }

    /// Bascule l'id en place, retourne true s'il est maintenant favori
    fn toggle(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|fav| fav == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        }
    }

    /// Encode l'ensemble en tableau JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.ids)
    }

    /// Décode une valeur persistée
    ///
    /// Erreur si ce n'est pas du JSON ou pas un tableau.
    /// Les entrées non-string sont ignorées.
    fn parse(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;

        match value {
            Value::Array(items) => Ok(Self::from_ids(
                items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_string)),
            )),
            other => Err(format!("expected a JSON array, got {}", json_kind(&other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// FavoritesStore
// ============================================================================
// CONCEPT : Pas de singleton caché
// - Construit une fois dans main() avec son backend
// - Possédé par DashboardState, passé par référence ailleurs
// ============================================================================

/// Favoris en mémoire + surface de persistance injectée
pub struct FavoritesStore {
    storage: Box<dyn KeyValueStore>,
    favorites: FavoriteSet,
}

impl FavoritesStore {
    /// Ouvre le store et charge les favoris persistés
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            storage,
            favorites: FavoriteSet::new(),
        };
        store.favorites = store.load();
        info!(count = store.favorites.len(), "Favorites loaded");
        store
    }

    /// Lit les favoris persistés
    ///
    /// N'échoue jamais : valeur absente, illisible ou pas un tableau
    /// => ensemble vide (l'erreur est seulement loggée).
    pub fn load(&self) -> FavoriteSet {
        let raw = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted favorites");
                return FavoriteSet::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted favorites, starting empty");
                return FavoriteSet::new();
            }
        };

        match FavoriteSet::parse(&raw) {
            Ok(set) => set,
            Err(reason) => {
                warn!(%reason, "Malformed persisted favorites, starting empty");
                FavoriteSet::new()
            }
        }
    }

    /// Écrase l'état persisté avec l'ensemble donné
    pub fn persist(&mut self, set: &FavoriteSet) -> Result<(), PersistenceError> {
        let json = set.to_json()?;
        self.storage.set(FAVORITES_KEY, &json)
    }

    /// Bascule un favori puis persiste
    ///
    /// En cas d'échec de persistance, l'ensemble en mémoire reste modifié :
    /// il fait foi pour la session courante.
    pub fn toggle(&mut self, id: &str) -> Result<(), PersistenceError> {
        let now_favorite = self.favorites.toggle(id);
        debug!(id, now_favorite, "Favorite toggled");

        let snapshot = self.favorites.clone();
        self.persist(&snapshot)
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }
}
