// ============================================================================
// LazyCoin - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Sources de données de marché (CoinGecko)
pub mod app;       // État de l'application TUI
pub mod config;    // Configuration (variables d'environnement)
pub mod dashboard; // Filtre, pagination, état du dashboard
pub mod error;     // Erreurs typées
pub mod models;    // Structures de données
pub mod storage;   // Persistance des favoris
pub mod ui;        // Interface utilisateur
pub mod worker;    // Worker thread (requêtes réseau)
