// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;          // Coin (liste de marché) et CoinDetail (fiche complète)
pub mod price_history; // Historique de prix synthétique pour les line charts

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazycoin::models::coin::Coin;
// On peut faire : use lazycoin::models::Coin;
pub use coin::{format_amount, format_usd, Coin, CoinDetail};
pub use price_history::{
    generate_price_history, generate_price_history_at, PriceHistoryPoint, DEFAULT_HISTORY_DAYS,
};
