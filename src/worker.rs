// ============================================================================
// Background Worker
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé avec son propre runtime tokio
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - L'event loop ne bloque jamais sur le réseau
// ============================================================================

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::api::MarketDataSource;
use crate::app::AppCommand;
use crate::models::{Coin, CoinDetail};

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
pub enum AppResult {
    /// Liste de marché chargée
    MarketLoaded(Vec<Coin>),

    /// Échec du chargement de la liste
    MarketFailed(String),

    /// Fiche détaillée chargée
    DetailLoaded(Box<CoinDetail>),

    /// Échec du chargement de la fiche
    DetailFailed { id: String, error: String },
}

/// Exécute une commande contre la source de données
///
/// CONCEPT RUST : &dyn Trait
/// - Le worker ne connaît que MarketDataSource, pas CoinGecko
/// - Les tests passent une fausse source en mémoire
pub async fn execute(source: &dyn MarketDataSource, command: AppCommand) -> AppResult {
    match command {
        AppCommand::RefreshMarket => match source.fetch_market_list().await {
            Ok(coins) => {
                info!(count = coins.len(), "Market list loaded");
                AppResult::MarketLoaded(coins)
            }
            Err(e) => {
                error!(error = %e, "Failed to load market list");
                AppResult::MarketFailed(e.to_string())
            }
        },

        AppCommand::LoadDetail { id } => match source.fetch_coin_detail(&id).await {
            Ok(detail) => {
                info!(id = %id, "Coin detail loaded");
                AppResult::DetailLoaded(Box::new(detail))
            }
            Err(e) => {
                error!(id = %id, error = %e, "Failed to load coin detail");
                AppResult::DetailFailed {
                    id,
                    error: e.to_string(),
                }
            }
        },
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - Le thread s'arrête quand command_tx est droppé (channel fermé)
pub fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    source: Arc<dyn MarketDataSource>,
) -> std::io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Runtime::new()?;

    std::thread::Builder::new()
        .name("lazycoin-worker".to_string())
        .spawn(move || {
            // CONCEPT : Command processing loop
            // - recv() bloque le worker (pas l'UI)
            // - block_on() exécute la requête async jusqu'au bout
            while let Ok(command) = command_rx.recv() {
                info!(?command, "Worker received command");

                let result = runtime.block_on(execute(source.as_ref(), command));
                if result_tx.send(result).is_err() {
                    // L'event loop est terminée
                    break;
                }
            }
            info!("Worker thread exiting (channel closed)");
        })
}

// ============================================================================
// Tests unitaires
// ============================================================================
