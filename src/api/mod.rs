// ============================================================================
// Module : api
// ============================================================================
// Sources de données de marché. Le reste de l'application ne connaît que le
// trait MarketDataSource : CoinGecko en production, un faux en test.
// ============================================================================

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Coin, CoinDetail};

pub mod coingecko; // Client API CoinGecko

pub use coingecko::CoinGeckoClient;

/// Source de la liste de marché et des fiches détaillées
///
/// CONCEPT RUST : async-trait
/// - Les méthodes async dans un trait utilisé via `dyn` passent par
///   #[async_trait] (futures boxées)
/// - Send + Sync : partagé entre threads via Arc<dyn MarketDataSource>
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Top N des coins par market cap, en USD
    async fn fetch_market_list(&self) -> Result<Vec<Coin>, FetchError>;

    /// Fiche détaillée d'un coin
    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError>;
}
