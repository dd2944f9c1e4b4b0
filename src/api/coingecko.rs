// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère la liste de marché et les fiches détaillées depuis CoinGecko
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Erreurs typées (FetchError) au lieu d'anyhow dans la bibliothèque
// 3. Serde : désérialisation JSON automatique
// 4. async-trait : implémentation du trait MarketDataSource
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::MarketDataSource;
use crate::config::Config;
use crate::error::FetchError;
use crate::models::{Coin, CoinDetail};

const USER_AGENT: &str = concat!("lazycoin/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

// ============================================================================
// Structures pour parser la fiche détaillée
// ============================================================================
// La liste de marché est plate : elle se désérialise directement en Coin.
// La fiche détaillée est imbriquée ({ market_data: { current_price: { usd } } }),
// on la mappe ici puis on l'aplatit en CoinDetail.
//
// CONCEPT SERDE : #[serde(default)]
// - Champ absent ou null => valeur par défaut au lieu d'une erreur
// ============================================================================

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: String,
    #[serde(default)]
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<ImageUrls>,
    #[serde(default)]
    market_data: Option<MarketData>,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default)]
    links: Option<Links>,
    #[serde(default)]
    genesis_date: Option<String>,
    #[serde(default)]
    sentiment_votes_up_percentage: Option<f64>,
    #[serde(default)]
    sentiment_votes_down_percentage: Option<f64>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    coingecko_rank: Option<u32>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ImageUrls {
    large: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsdValue {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: UsdValue,
    #[serde(default)]
    market_cap: UsdValue,
    #[serde(default)]
    high_24h: UsdValue,
    #[serde(default)]
    low_24h: UsdValue,
    #[serde(default)]
    total_volume: UsdValue,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d: Option<f64>,
    price_change_percentage_30d: Option<f64>,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
    max_supply: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Description {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(default)]
    homepage: Vec<Option<String>>,
    #[serde(default)]
    blockchain_site: Vec<Option<String>>,
}

impl DetailResponse {
    /// Aplatit la réponse en CoinDetail
    ///
    /// CONCEPT RUST : Ownership
    /// - self est consommé (move), les String sont déplacées sans copie
    fn into_detail(self) -> CoinDetail {
        let market = self.market_data;
        let usd = |pick: fn(&MarketData) -> &UsdValue| {
            market.as_ref().and_then(|m| pick(m).usd).unwrap_or(0.0)
        };
        let pct = |pick: fn(&MarketData) -> Option<f64>| {
            market.as_ref().and_then(pick).unwrap_or(0.0)
        };

        let (homepage, blockchain_site) = match self.links {
            Some(links) => (
                first_non_empty(links.homepage),
                first_non_empty(links.blockchain_site),
            ),
            None => (None, None),
        };

        CoinDetail {
            current_price: usd(|m| &m.current_price),
            market_cap: usd(|m| &m.market_cap),
            high_24h: usd(|m| &m.high_24h),
            low_24h: usd(|m| &m.low_24h),
            total_volume: usd(|m| &m.total_volume),
            price_change_percentage_24h: pct(|m| m.price_change_percentage_24h),
            price_change_percentage_7d: pct(|m| m.price_change_percentage_7d),
            price_change_percentage_30d: pct(|m| m.price_change_percentage_30d),
            circulating_supply: pct(|m| m.circulating_supply),
            total_supply: market.as_ref().and_then(|m| m.total_supply),
            max_supply: market.as_ref().and_then(|m| m.max_supply),
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image_large: self.image.and_then(|image| image.large),
            description: self
                .description
                .and_then(|d| d.en)
                .map(|text| strip_html(&text))
                .unwrap_or_default(),
            homepage,
            blockchain_site,
            genesis_date: self
                .genesis_date
                .and_then(|date| NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()),
            sentiment_votes_up_percentage: self.sentiment_votes_up_percentage,
            sentiment_votes_down_percentage: self.sentiment_votes_down_percentage,
            market_cap_rank: self.market_cap_rank.or(self.coingecko_rank),
            last_updated: self.last_updated,
        }
    }
}

/// Premier lien non vide d'une liste CoinGecko (souvent remplie de "")
fn first_non_empty(links: Vec<Option<String>>) -> Option<String> {
    links
        .into_iter()
        .flatten()
        .map(|link| link.trim().to_string())
        .find(|link| !link.is_empty())
}

/// Retire les balises HTML d'une description (liens <a href=...>)
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP CoinGecko
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    per_page: usize,
}

impl CoinGeckoClient {
    /// Crée le client depuis la configuration
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_options(
            &config.api_url,
            config.market_size,
            config.timeout,
            config.api_key.as_deref(),
        )
    }

    /// Crée le client avec des options explicites
    pub fn with_options(
        base_url: &str,
        per_page: usize,
        timeout: Duration,
        api_key: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value =
                HeaderValue::from_str(key).map_err(|e| FetchError::Client(e.to_string()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page,
        })
    }

    /// GET + vérification du statut, retourne le corps brut
    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "Sending HTTP request to CoinGecko");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, url, "CoinGecko returned error status");
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    /// Liste de marché triée par market cap décroissante
    #[instrument(skip(self))]
    async fn fetch_market_list(&self) -> Result<Vec<Coin>, FetchError> {
        let url = build_markets_url(&self.base_url, self.per_page);
        debug!(per_page = self.per_page, "Fetching market list");
        let body = self.get_body(&url).await?;

        let coins = parse_market_list(&body)?;
        info!(count = coins.len(), "Successfully fetched market list");
        Ok(coins)
    }

    /// Fiche détaillée d'un coin
    #[instrument(skip(self))]
    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError> {
        let url = build_detail_url(&self.base_url, id);

        let body = match self.get_body(&url).await {
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound(id.to_string()));
            }
            other => other?,
        };

        let detail = parse_coin_detail(&body)?;
        info!(name = %detail.name, "Successfully fetched coin detail");
        Ok(detail)
    }
}

// ============================================================================
// URLs et parsing (fonctions pures, testées sans réseau)
// ============================================================================

fn build_markets_url(base_url: &str, per_page: usize) -> String {
    format!(
        "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false",
        base_url, per_page
    )
}

fn build_detail_url(base_url: &str, id: &str) -> String {
    format!(
        "{}/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false",
        base_url, id
    )
}

fn parse_market_list(body: &str) -> Result<Vec<Coin>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn parse_coin_detail(body: &str) -> Result<CoinDetail, FetchError> {
    let response: DetailResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(response.into_detail())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MARKETS_JSON: &str = r#"[
        {
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 67012.5,
            "market_cap": 1320000000000,
            "market_cap_rank": 1,
            "total_volume": 25000000000,
            "price_change_percentage_24h": 2.1,
            "roi": null,
            "last_updated": "2024-03-15T10:00:00.000Z"
        },
        {
            "id": "ethereum",
            "symbol": "eth",
            "name": "Ethereum",
            "image": "https://assets.coingecko.com/coins/images/279/large/ethereum.png",
            "current_price": 3500.0,
            "market_cap": 420000000000,
            "price_change_percentage_24h": -0.8
        }
    ]"#;

    const DETAIL_JSON: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": { "thumb": "t.png", "small": "s.png", "large": "l.png" },
        "genesis_date": "2009-01-03",
        "sentiment_votes_up_percentage": 82.5,
        "sentiment_votes_down_percentage": 17.5,
        "market_cap_rank": 1,
        "description": { "en": "Bitcoin is the first <a href=\"https://x\">cryptocurrency</a> &amp; more." },
        "links": {
            "homepage": ["http://www.bitcoin.org", "", ""],
            "blockchain_site": ["", "https://mempool.space/"]
        },
        "market_data": {
            "current_price": { "usd": 67012.5, "eur": 61000 },
            "market_cap": { "usd": 1320000000000 },
            "high_24h": { "usd": 68000 },
            "low_24h": { "usd": 65000 },
            "total_volume": { "usd": 25000000000 },
            "price_change_percentage_24h": 2.1,
            "price_change_percentage_7d": -3.4,
            "price_change_percentage_30d": 12.0,
            "circulating_supply": 19650000,
            "total_supply": 21000000,
            "max_supply": 21000000
        },
        "last_updated": "2024-03-15T10:00:00.000Z"
    }"#;

    #[test]
    fn test_build_markets_url() {
        let url = build_markets_url("https://api.coingecko.com/api/v3", 23);
        assert!(url.starts_with("https://api.coingecko.com/api/v3/coins/markets?"));
        assert!(url.contains("vs_currency=usd"));
        assert!(url.contains("order=market_cap_desc"));
        assert!(url.contains("per_page=23"));
        assert!(url.contains("sparkline=false"));
    }

    #[test]
    fn test_build_detail_url() {
        let url = build_detail_url("http://localhost", "bitcoin");
        assert!(url.starts_with("http://localhost/coins/bitcoin?"));
        assert!(url.contains("tickers=false"));
    }

    #[test]
    fn test_parse_market_list() {
        let coins = parse_market_list(MARKETS_JSON).unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[1].name, "Ethereum");
        assert_eq!(coins[1].price_change_percentage_24h, Some(-0.8));
    }

    #[test]
    fn test_parse_market_list_rejects_object() {
        let result = parse_market_list(r#"{"status":{"error_code":429}}"#);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_parse_coin_detail() {
        let detail = parse_coin_detail(DETAIL_JSON).unwrap();

        assert_eq!(detail.id, "bitcoin");
        assert_eq!(detail.image_large.as_deref(), Some("l.png"));
        assert_eq!(detail.current_price, 67012.5);
        assert_eq!(detail.high_24h, 68000.0);
        assert_eq!(detail.price_change_percentage_7d, -3.4);
        assert_eq!(detail.max_supply, Some(21_000_000.0));
        assert_eq!(detail.homepage.as_deref(), Some("http://www.bitcoin.org"));
        assert_eq!(detail.blockchain_site.as_deref(), Some("https://mempool.space/"));
        assert_eq!(detail.genesis_date, NaiveDate::from_ymd_opt(2009, 1, 3));
        assert_eq!(detail.market_cap_rank, Some(1));
        assert_eq!(
            detail.description,
            "Bitcoin is the first cryptocurrency & more."
        );
        assert!(detail.last_updated.is_some());
    }

    #[test]
    fn test_parse_coin_detail_with_nulls() {
        let json = r#"{
            "id": "tiny",
            "symbol": "tny",
            "name": "Tiny",
            "genesis_date": null,
            "coingecko_rank": 4242,
            "description": { "en": "" },
            "links": { "homepage": [null, ""], "blockchain_site": [] },
            "market_data": {
                "current_price": { "usd": 0.0001 },
                "market_cap": {},
                "high_24h": { "usd": null },
                "price_change_percentage_24h": null,
                "circulating_supply": null,
                "total_supply": null,
                "max_supply": null
            },
            "last_updated": null
        }"#;

        let detail = parse_coin_detail(json).unwrap();
        assert_eq!(detail.current_price, 0.0001);
        assert_eq!(detail.market_cap, 0.0);
        assert_eq!(detail.high_24h, 0.0);
        assert_eq!(detail.low_24h, 0.0);
        assert_eq!(detail.price_change_percentage_24h, 0.0);
        assert_eq!(detail.total_supply, None);
        assert_eq!(detail.homepage, None);
        assert_eq!(detail.genesis_date, None);
        assert_eq!(detail.market_cap_rank, Some(4242));
        assert_eq!(detail.image_large, None);
        assert_eq!(detail.description, "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("plain"), "plain");
        assert_eq!(strip_html("<p>a <b>b</b></p>\n"), "a b");
        assert_eq!(strip_html("1 &lt; 2"), "1 &lt; 2");
    }

    #[test]
    fn test_client_rejects_bad_api_key() {
        let result = CoinGeckoClient::with_options(
            "http://localhost",
            23,
            Duration::from_secs(1),
            Some("bad\nkey"),
        );
        assert!(matches!(result, Err(FetchError::Client(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) sur localhost : connexion refusée, pas d'accès Internet
        let client =
            CoinGeckoClient::with_options("http://127.0.0.1:9", 23, Duration::from_secs(2), None)
                .unwrap();

        let result = client.fetch_market_list().await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
