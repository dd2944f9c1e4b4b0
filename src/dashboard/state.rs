// ============================================================================
// DashboardState
// ============================================================================
// Orchestration du cœur : liste de coins, recherche, favoris, pagination
//
// PATTERN : "Application State" (comme App)
// - Toutes les modifications passent par des méthodes
// - Chaque modification incrémente `revision`
// - Le rendu lit un DashboardSnapshot immuable
//
// Trois fenêtres de pagination indépendantes :
// - Main : liste filtrée par la recherche
// - Favorites : coins favoris (dans l'ordre de la liste de marché)
// - Charts : grille des line charts, sur la liste complète
// ============================================================================

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::{
    Config, DEFAULT_CHARTS_PAGE_SIZE, DEFAULT_FAVORITES_PAGE_SIZE, DEFAULT_PAGE_SIZE,
};
use crate::dashboard::{filter_coins, Paginator};
use crate::models::Coin;
use crate::storage::{FavoriteSet, FavoritesStore};

/// Nombre de coins du graphique de répartition (donut)
pub const MARKET_SHARE_TOP_N: usize = 10;

/// Zone paginée du dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Main,
    Favorites,
    Charts,
}

/// Tailles de page des trois zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub main: usize,
    pub favorites: usize,
    pub charts: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            main: DEFAULT_PAGE_SIZE,
            favorites: DEFAULT_FAVORITES_PAGE_SIZE,
            charts: DEFAULT_CHARTS_PAGE_SIZE,
        }
    }
}

impl From<&Config> for PageSizes {
    fn from(config: &Config) -> Self {
        Self {
            main: config.page_size,
            favorites: config.favorites_page_size,
            charts: config.charts_page_size,
        }
    }
}

/// Part de marché d'un coin parmi le top N
#[derive(Debug, Clone, PartialEq)]
pub struct MarketShare {
    pub name: String,
    pub market_cap: f64,
    /// Pourcentage de la somme des market caps du top N
    pub share: f64,
}

/// Infos de pagination prêtes à afficher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl From<&Paginator> for PageInfo {
    fn from(pager: &Paginator) -> Self {
        Self {
            current_page: pager.current_page(),
            total_pages: pager.total_pages(),
            has_prev: pager.has_prev(),
            has_next: pager.has_next(),
        }
    }
}

/// Un coin visible avec son état favori
#[derive(Debug, Clone, PartialEq)]
pub struct CoinView {
    pub coin: Coin,
    pub is_favorite: bool,
}

/// Vue immuable de l'état, pour la couche de rendu
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub revision: u64,
    pub query: String,
    pub loading: bool,
    pub last_error: Option<String>,
    pub last_refresh: Option<DateTime<Local>>,
    pub total_coins: usize,
    pub filtered_count: usize,
    pub visible: Vec<CoinView>,
    pub main_page: PageInfo,
    pub favorites: Vec<Coin>,
    pub favorites_count: usize,
    pub favorites_page: PageInfo,
    pub chart_coins: Vec<Coin>,
    pub charts_page: PageInfo,
}

/// État du dashboard
pub struct DashboardState {
    coins: Vec<Coin>,
    query: String,
    filtered: Vec<Coin>,
    favorites: FavoritesStore,
    main_pager: Paginator,
    favorites_pager: Paginator,
    charts_pager: Paginator,
    loading: bool,
    last_error: Option<String>,
    last_refresh: Option<DateTime<Local>>,
    revision: u64,
}

impl DashboardState {
    /// Crée un dashboard vide avec les favoris déjà chargés
    pub fn new(favorites: FavoritesStore, page_sizes: PageSizes) -> Self {
        Self {
            coins: Vec::new(),
            query: String::new(),
            filtered: Vec::new(),
            favorites,
            main_pager: Paginator::new(page_sizes.main),
            favorites_pager: Paginator::new(page_sizes.favorites),
            charts_pager: Paginator::new(page_sizes.charts),
            loading: false,
            last_error: None,
            last_refresh: None,
            revision: 0,
        }
    }

    // ========================================================================
    // Données de marché
    // ========================================================================

    /// Active l'indicateur de chargement (refresh en cours)
    pub fn begin_refresh(&mut self) {
        self.loading = true;
        self.bump();
    }

    /// Remplace la liste de coins après un fetch réussi
    ///
    /// La requête et les favoris sont conservés ; les fenêtres de pagination
    /// ne bougent pas, même si la page courante devient vide.
    pub fn apply_market_list(&mut self, coins: Vec<Coin>) {
        info!(count = coins.len(), "Market list applied");
        self.coins = coins;
        self.filtered = filter_coins(&self.coins, &self.query);
        self.loading = false;
        self.last_error = None;
        self.last_refresh = Some(Local::now());
        self.sync_totals();
        self.bump();
    }

    /// Fetch échoué : l'indicateur s'éteint, les données précédentes restent
    pub fn fail_refresh(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Market refresh failed, keeping previous data");
        self.loading = false;
        self.last_error = Some(message);
        self.bump();
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    /// Applique une recherche et revient à la première page
    pub fn search(&mut self, query: &str) {
        debug!(query, "Search applied");
        self.query = query.to_string();
        self.filtered = filter_coins(&self.coins, &self.query);
        self.main_pager.set_total_items(self.filtered.len());
        self.main_pager.reset();
        self.bump();
    }

    /// Annule la recherche (filtre identité) et revient à la première page
    pub fn cancel_search(&mut self) {
        self.search("");
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    /// Bascule un favori
    ///
    /// Un échec de persistance est loggé puis ignoré : le favori reste
    /// basculé en mémoire. La page de la liste principale ne change pas.
    pub fn toggle_favorite(&mut self, id: &str) {
        if let Err(e) = self.favorites.toggle(id) {
            warn!(id, error = %e, "Failed to persist favorites, keeping in-memory state");
        }
        let favorite_count = self.favorite_coins().len();
        self.favorites_pager.set_total_items(favorite_count);
        self.bump();
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn favorite_set(&self) -> &FavoriteSet {
        self.favorites.favorites()
    }

    /// Coins favoris présents dans la liste, dans l'ordre de la liste
    pub fn favorite_coins(&self) -> Vec<Coin> {
        self.coins
            .iter()
            .filter(|coin| self.favorites.is_favorite(&coin.id))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    pub fn next_page(&mut self, section: Section) {
        self.pager_mut(section).next();
        self.bump();
    }

    pub fn prev_page(&mut self, section: Section) {
        self.pager_mut(section).prev();
        self.bump();
    }

    pub fn pager(&self, section: Section) -> &Paginator {
        match section {
            Section::Main => &self.main_pager,
            Section::Favorites => &self.favorites_pager,
            Section::Charts => &self.charts_pager,
        }
    }

    fn pager_mut(&mut self, section: Section) -> &mut Paginator {
        match section {
            Section::Main => &mut self.main_pager,
            Section::Favorites => &mut self.favorites_pager,
            Section::Charts => &mut self.charts_pager,
        }
    }

    /// Page visible de la liste principale (filtrée)
    pub fn visible_coins(&self) -> &[Coin] {
        self.main_pager.slice(&self.filtered)
    }

    /// Page visible des favoris
    pub fn visible_favorites(&self) -> Vec<Coin> {
        let favorites = self.favorite_coins();
        self.favorites_pager.slice(&favorites).to_vec()
    }

    /// Page visible de la grille de line charts
    pub fn visible_chart_coins(&self) -> &[Coin] {
        self.charts_pager.slice(&self.coins)
    }

    // ========================================================================
    // Lecture
    // ========================================================================

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn filtered_coins(&self) -> &[Coin] {
        &self.filtered
    }

    pub fn coin(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|coin| coin.id == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Répartition de la market cap sur les `top_n` premiers coins
    ///
    /// La liste est déjà triée par market cap décroissante (CoinGecko).
    pub fn market_share(&self, top_n: usize) -> Vec<MarketShare> {
        let top = &self.coins[..top_n.min(self.coins.len())];
        let total: f64 = top.iter().map(|coin| coin.market_cap).sum();

        top.iter()
            .map(|coin| MarketShare {
                name: coin.name.clone(),
                market_cap: coin.market_cap,
                share: if total > 0.0 {
                    coin.market_cap / total * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Photographie immuable de l'état courant
    pub fn snapshot(&self) -> DashboardSnapshot {
        let visible = self
            .visible_coins()
            .iter()
            .map(|coin| CoinView {
                coin: coin.clone(),
                is_favorite: self.is_favorite(&coin.id),
            })
            .collect();

        DashboardSnapshot {
            revision: self.revision,
            query: self.query.clone(),
            loading: self.loading,
            last_error: self.last_error.clone(),
            last_refresh: self.last_refresh,
            total_coins: self.coins.len(),
            filtered_count: self.filtered.len(),
            visible,
            main_page: PageInfo::from(&self.main_pager),
            favorites: self.visible_favorites(),
            favorites_count: self.favorites.favorites().len(),
            favorites_page: PageInfo::from(&self.favorites_pager),
            chart_coins: self.visible_chart_coins().to_vec(),
            charts_page: PageInfo::from(&self.charts_pager),
        }
    }

    // ========================================================================
    // Interne
    // ========================================================================

    /// Recalcule les tailles des collections paginées (sans reset)
    fn sync_totals(&mut self) {
        let favorite_count = self.favorite_coins().len();
        self.main_pager.set_total_items(self.filtered.len());
        self.favorites_pager.set_total_items(favorite_count);
        self.charts_pager.set_total_items(self.coins.len());
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore, FAVORITES_KEY};

    fn coin(id: &str, name: &str, market_cap: f64) -> Coin {
        Coin::new(id, name, 1.0, market_cap)
    }

    fn market() -> Vec<Coin> {
        vec![
            coin("bitcoin", "Bitcoin", 600.0),
            coin("ethereum", "Ethereum", 200.0),
            coin("tether", "Tether", 100.0),
            coin("solana", "Solana", 50.0),
            coin("bitcoin-cash", "Bitcoin Cash", 30.0),
            coin("cardano", "Cardano", 20.0),
        ]
    }

    fn state_with(backend: MemoryKeyValueStore) -> DashboardState {
        let favorites = FavoritesStore::open(Box::new(backend));
        let sizes = PageSizes { main: 2, favorites: 2, charts: 4 };
        DashboardState::new(favorites, sizes)
    }

    fn ids(coins: &[Coin]) -> Vec<&str> {
        coins.iter().map(|c| c.id.as_str()).collect()
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(Some(r#"["solana"]"#.to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn test_initial_state() {
        let state = state_with(MemoryKeyValueStore::new());
        assert!(state.coins().is_empty());
        assert!(state.visible_coins().is_empty());
        assert_eq!(state.pager(Section::Main).total_pages(), 0);
        assert_eq!(state.pager(Section::Main).current_page(), 0);
    }

    #[test]
    fn test_search_filters_and_resets_page() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());

        state.next_page(Section::Main);
        assert_eq!(ids(state.visible_coins()), ["tether", "solana"]);

        state.search("BITCOIN");
        assert_eq!(state.pager(Section::Main).start_index(), 0);
        assert_eq!(ids(state.visible_coins()), ["bitcoin", "bitcoin-cash"]);
        assert_eq!(state.pager(Section::Main).total_pages(), 1);

        state.cancel_search();
        assert_eq!(state.query(), "");
        assert_eq!(state.filtered_coins().len(), 6);
    }

    #[test]
    fn test_refresh_keeps_query_favorites_and_page() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());
        state.toggle_favorite("ethereum");
        state.next_page(Section::Main);
        state.next_page(Section::Main);
        assert_eq!(state.pager(Section::Main).start_index(), 4);

        // Nouveau fetch plus court : la page reste, et devient vide
        state.apply_market_list(market()[..3].to_vec());
        assert_eq!(state.pager(Section::Main).start_index(), 4);
        assert!(state.visible_coins().is_empty());
        assert!(state.is_favorite("ethereum"));

        state.prev_page(Section::Main);
        assert_eq!(ids(state.visible_coins()), ["tether"]);
    }

    #[test]
    fn test_refresh_keeps_search_query() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());
        state.search("sol");

        let mut updated = market();
        updated[3].current_price = 180.0;
        state.apply_market_list(updated);

        assert_eq!(state.query(), "sol");
        assert_eq!(state.visible_coins().len(), 1);
        assert_eq!(state.visible_coins()[0].current_price, 180.0);
    }

    #[test]
    fn test_toggle_does_not_touch_main_page() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());
        state.next_page(Section::Main);

        state.toggle_favorite("tether");
        assert_eq!(state.pager(Section::Main).start_index(), 2);
        assert_eq!(ids(state.visible_coins()), ["tether", "solana"]);

        let snapshot = state.snapshot();
        assert!(snapshot.visible[0].is_favorite);
        assert!(!snapshot.visible[1].is_favorite);
    }

    #[test]
    fn test_favorites_view_follows_market_order() {
        let backend = MemoryKeyValueStore::new();
        let mut state = state_with(backend.clone());
        state.apply_market_list(market());

        state.toggle_favorite("cardano");
        state.toggle_favorite("bitcoin");
        state.toggle_favorite("unknown-coin");

        assert_eq!(ids(&state.favorite_coins()), ["bitcoin", "cardano"]);
        assert_eq!(state.favorite_set().len(), 3);
        assert_eq!(
            backend.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["cardano","bitcoin","unknown-coin"]"#)
        );
    }

    #[test]
    fn test_favorites_page_not_clamped_after_removal() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());
        for id in ["bitcoin", "ethereum", "tether"] {
            state.toggle_favorite(id);
        }

        state.next_page(Section::Favorites);
        assert_eq!(ids(&state.visible_favorites()), ["tether"]);

        state.toggle_favorite("tether");
        assert!(state.visible_favorites().is_empty());
        assert_eq!(state.pager(Section::Favorites).start_index(), 2);

        state.prev_page(Section::Favorites);
        assert_eq!(ids(&state.visible_favorites()), ["bitcoin", "ethereum"]);
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        let favorites = FavoritesStore::open(Box::new(ReadOnlyStore));
        let mut state = DashboardState::new(favorites, PageSizes::default());
        state.apply_market_list(market());

        assert!(state.is_favorite("solana"));
        state.toggle_favorite("bitcoin");
        assert!(state.is_favorite("bitcoin"));
        assert_eq!(ids(&state.favorite_coins()), ["bitcoin", "solana"]);
    }

    #[test]
    fn test_failed_refresh_keeps_data() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());

        state.begin_refresh();
        assert!(state.is_loading());

        state.fail_refresh("HTTP 429");
        assert!(!state.is_loading());
        assert_eq!(state.last_error(), Some("HTTP 429"));
        assert_eq!(state.coins().len(), 6);

        state.apply_market_list(market());
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn test_charts_page_uses_full_list() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());
        state.search("bitcoin");

        assert_eq!(state.visible_chart_coins().len(), 4);
        state.next_page(Section::Charts);
        assert_eq!(ids(state.visible_chart_coins()), ["bitcoin-cash", "cardano"]);
    }

    #[test]
    fn test_market_share() {
        let mut state = state_with(MemoryKeyValueStore::new());
        state.apply_market_list(market());

        let shares = state.market_share(2);
        assert_eq!(shares.len(), 2);
        assert!((shares[0].share - 75.0).abs() < 1e-9);
        assert!((shares[1].share - 25.0).abs() < 1e-9);

        assert_eq!(state.market_share(MARKET_SHARE_TOP_N).len(), 6);
    }

    #[test]
    fn test_revision_increases() {
        let mut state = state_with(MemoryKeyValueStore::new());
        let r0 = state.revision();
        state.apply_market_list(market());
        state.search("a");
        state.toggle_favorite("bitcoin");
        assert!(state.revision() >= r0 + 3);
        assert_eq!(state.snapshot().revision, state.revision());
    }
}
