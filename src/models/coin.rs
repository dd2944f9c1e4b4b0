// ============================================================================
// Structures : Coin et CoinDetail
// ============================================================================
// Coin : une ligne de la liste de marché CoinGecko (/coins/markets)
// CoinDetail : la fiche complète d'un coin (/coins/{id})
//
// CONCEPTS RUST :
// 1. #[derive(Deserialize)] directement sur le modèle (le JSON est déjà plat)
// 2. deserialize_with : CoinGecko renvoie parfois null pour les prix
// 3. Option<T> pour les champs réellement facultatifs
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Une cryptomonnaie de la liste de marché
///
/// `id` est la seule clé d'identité : le nom, le prix et la market cap
/// peuvent changer d'un fetch à l'autre, l'id jamais.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Identifiant stable (ex: "bitcoin")
    pub id: String,

    /// Symbole (ex: "btc")
    #[serde(default)]
    pub symbol: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// URL du logo
    #[serde(default)]
    pub image: String,

    /// Prix actuel en USD
    #[serde(default, deserialize_with = "null_as_zero")]
    pub current_price: f64,

    /// Capitalisation en USD
    #[serde(default, deserialize_with = "null_as_zero")]
    pub market_cap: f64,

    /// Variation sur 24h en pourcentage
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl Coin {
    /// Crée un coin minimal (prix et market cap fournis)
    pub fn new(id: &str, name: &str, current_price: f64, market_cap: f64) -> Self {
        Self {
            id: id.to_string(),
            symbol: String::new(),
            name: name.to_string(),
            image: String::new(),
            current_price,
            market_cap,
            price_change_percentage_24h: None,
        }
    }

    /// Retourne true si le coin est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.price_change_percentage_24h
            .map(|c| c >= 0.0)
            .unwrap_or(false)
    }

    /// Formatte le coin pour une ligne de la liste
    ///
    /// Format : "★ Bitcoin              $67,012.00   MC $1,320,000,000"
    ///
    /// Le nom est tronqué à 20 caractères
    pub fn display(&self, is_favorite: bool) -> String {
        let star = if is_favorite { '★' } else { '☆' };

        let truncated_name = if self.name.chars().count() <= 20 {
            self.name.clone()
        } else {
            let truncated: String = self.name.chars().take(19).collect();
            format!("{}…", truncated)
        };

        format!(
            "{} {:<20} {:>16}   MC {:>20}",
            star,
            truncated_name,
            format_usd(self.current_price),
            format_usd(self.market_cap)
        )
    }
}

/// Fiche détaillée d'un coin
///
/// Construite par le client API à partir de la réponse imbriquée de CoinGecko
/// (voir api::coingecko), les montants sont tous en USD.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image_large: Option<String>,

    pub current_price: f64,
    pub market_cap: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub total_volume: f64,

    pub price_change_percentage_24h: f64,
    pub price_change_percentage_7d: f64,
    pub price_change_percentage_30d: f64,

    pub circulating_supply: f64,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,

    /// Description anglaise, balises HTML retirées
    pub description: String,
    pub homepage: Option<String>,
    pub blockchain_site: Option<String>,
    pub genesis_date: Option<NaiveDate>,

    pub sentiment_votes_up_percentage: Option<f64>,
    pub sentiment_votes_down_percentage: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Désérialise un f64 nullable en 0.0
///
/// CONCEPT SERDE : deserialize_with
/// - On lit d'abord un Option<f64>
/// - None (null JSON) devient 0.0
pub(crate) fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Formatte un montant USD avec séparateurs de milliers
///
/// Exemples : 1234.5 -> "$1,234.50", 0.000123 -> "$0.000123"
pub fn format_usd(value: f64) -> String {
    // Les petits prix (memecoins) gardent leurs décimales significatives
    if value != 0.0 && value.abs() < 1.0 {
        return format!("${:.6}", value);
    }

    let formatted = format!("{:.2}", value.abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, dec_part)
}

/// Formatte une quantité (supply) avec séparateurs de milliers, sans décimales
pub fn format_amount(value: f64) -> String {
    let usd = format_usd(value.round());
    usd.trim_start_matches('$')
        .trim_end_matches(".00")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_market_entry() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 67012.5,
            "market_cap": 1320000000000,
            "market_cap_rank": 1,
            "price_change_percentage_24h": -1.25
        }"#;

        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.id, "bitcoin");
        assert_eq!(coin.symbol, "btc");
        assert_eq!(coin.current_price, 67012.5);
        assert_eq!(coin.market_cap, 1_320_000_000_000.0);
        assert_eq!(coin.price_change_percentage_24h, Some(-1.25));
        assert!(!coin.is_positive());
    }

    #[test]
    fn test_deserialize_null_prices() {
        let json = r#"{
            "id": "ghost",
            "name": "Ghost",
            "current_price": null,
            "market_cap": null,
            "price_change_percentage_24h": null
        }"#;

        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.current_price, 0.0);
        assert_eq!(coin.market_cap, 0.0);
        assert_eq!(coin.price_change_percentage_24h, None);
        assert_eq!(coin.image, "");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.0), "$999.00");
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(1_320_000_000_000.0), "$1,320,000,000,000.00");
        assert_eq!(format_usd(-1234.0), "-$1,234.00");
        assert_eq!(format_usd(0.000123), "$0.000123");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(19_700_000.4), "19,700,000");
        assert_eq!(format_amount(21_000_000.0), "21,000,000");
    }

    #[test]
    fn test_display_truncates_and_stars() {
        let coin = Coin::new("x", "A Very Long Coin Name Indeed", 1.0, 10.0);
        let line = coin.display(true);
        assert!(line.starts_with('★'));
        assert!(line.contains("A Very Long Coin Na…"));

        let plain = Coin::new("b", "Beta", 2.0, 20.0).display(false);
        assert!(plain.starts_with('☆'));
    }
}
