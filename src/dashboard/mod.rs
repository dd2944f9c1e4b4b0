// ============================================================================
// Module : dashboard
// ============================================================================
// Cœur testable du dashboard : filtre de recherche, pagination, orchestration
// Aucune dépendance vers l'UI ni vers le réseau
// ============================================================================

pub mod filter;    // Recherche par nom (sous-chaîne, insensible à la casse)
pub mod paginator; // Fenêtres de pagination
pub mod state;     // DashboardState : orchestration + snapshots

pub use filter::filter_coins;
pub use paginator::Paginator;
pub use state::{
    CoinView, DashboardSnapshot, DashboardState, MarketShare, PageInfo, PageSizes, Section,
    MARKET_SHARE_TOP_N,
};
