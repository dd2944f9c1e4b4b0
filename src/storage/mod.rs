// ============================================================================
// Module : storage
// ============================================================================
// Persistance locale : surface clé-valeur durable + favoris
// ============================================================================

pub mod favorites; // FavoriteSet et FavoritesStore
pub mod kv;        // Trait KeyValueStore et ses backends (fichier, mémoire)

pub use favorites::{FavoriteSet, FavoritesStore, FAVORITES_KEY};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
