// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées de la bibliothèque
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display + Error à partir d'attributs
// 2. #[from] : conversion automatique avec l'opérateur ?
// 3. anyhow reste réservé au binaire (main.rs) pour le contexte
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Échec d'un appel à la source de données de marché (liste ou détail)
#[derive(Debug, Error)]
pub enum FetchError {
    /// Erreur réseau (DNS, connexion, timeout...)
    #[error("requête HTTP impossible : {0}")]
    Transport(#[from] reqwest::Error),

    /// Réponse HTTP hors 2xx
    #[error("CoinGecko a retourné HTTP {status} pour {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Identifiant de coin inconnu (HTTP 404 sur le détail)
    #[error("coin inconnu : {0}")]
    NotFound(String),

    /// JSON invalide ou inattendu
    #[error("réponse CoinGecko illisible : {0}")]
    Decode(String),

    /// Construction du client HTTP impossible
    #[error("client HTTP invalide : {0}")]
    Client(String),
}

/// Échec d'écriture (ou de lecture) de la surface clé-valeur des favoris
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("E/S sur {path:?} : {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encodage JSON des favoris impossible : {0}")]
    Encode(#[from] serde_json::Error),

    /// Stockage indisponible (ex : quota, backend simulé en échec)
    #[error("stockage indisponible : {0}")]
    Unavailable(String),
}

/// Variable d'environnement invalide
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} invalide ({value:?}) : {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("aucun répertoire de données disponible, définissez LAZYCOIN_DATA_DIR")]
    NoDataDir,
}
