// ============================================================================
// Configuration
// ============================================================================
// Paramètres de l'application lus depuis les variables d'environnement
// Chaque variable a une valeur par défaut : aucune n'est obligatoire
// ============================================================================

use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Nombre de coins demandés à CoinGecko (triés par market cap)
pub const DEFAULT_MARKET_SIZE: usize = 23;
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_FAVORITES_PAGE_SIZE: usize = 3;
pub const DEFAULT_CHARTS_PAGE_SIZE: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration complète de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API CoinGecko (sans slash final)
    pub api_url: String,

    /// Clé "demo" CoinGecko optionnelle (header x-cg-demo-api-key)
    pub api_key: Option<String>,

    /// Taille de la liste de marché (per_page)
    pub market_size: usize,

    /// Coins par page dans la liste principale
    pub page_size: usize,

    /// Coins par page dans la vue favoris
    pub favorites_page_size: usize,

    /// Graphiques par page dans l'écran Charts
    pub charts_page_size: usize,

    /// Nombre de jours de l'historique synthétique
    pub history_days: u32,

    pub timeout: Duration,

    /// Répertoire des favoris persistés
    pub data_dir: PathBuf,

    /// Répertoire des logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Construit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Construit la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Injection de dépendance par closure
    /// - Les tests passent une HashMap au lieu de modifier l'environnement
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("LAZYCOIN_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = lookup("LAZYCOIN_API_KEY").filter(|key| !key.trim().is_empty());

        let data_dir = match lookup("LAZYCOIN_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join("lazycoin"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let log_dir = lookup("LAZYCOIN_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            api_url,
            api_key,
            market_size: parse_positive(&lookup, "LAZYCOIN_MARKET_SIZE", DEFAULT_MARKET_SIZE)?,
            page_size: parse_positive(&lookup, "LAZYCOIN_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            favorites_page_size: parse_positive(
                &lookup,
                "LAZYCOIN_FAVORITES_PAGE_SIZE",
                DEFAULT_FAVORITES_PAGE_SIZE,
            )?,
            charts_page_size: parse_positive(
                &lookup,
                "LAZYCOIN_CHARTS_PAGE_SIZE",
                DEFAULT_CHARTS_PAGE_SIZE,
            )?,
            history_days: parse_positive(
                &lookup,
                "LAZYCOIN_HISTORY_DAYS",
                crate::models::DEFAULT_HISTORY_DAYS,
            )?,
            timeout: Duration::from_secs(parse_positive(
                &lookup,
                "LAZYCOIN_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            data_dir,
            log_dir,
        })
    }
}

/// Lit un entier strictement positif, ou la valeur par défaut si absent
///
/// Le type cible borne la valeur : un dépassement est une erreur de parsing.
fn parse_positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr<Err = ParseIntError> + Default + PartialEq,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|e: ParseIntError| {
        ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })?;

    if value == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "doit être supérieur à 0".to_string(),
        });
    }

    Ok(value)
}
