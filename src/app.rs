// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Composition : App possède le DashboardState (le cœur métier)
//
// PATTERN : "Application State"
// - App gère ce qui est propre au terminal : écran, sélection, saisie
// - DashboardState gère les coins, la recherche, les favoris, la pagination
// - Les actions qui demandent du réseau retournent un AppCommand
//   que l'event loop transmet au worker
// ============================================================================

use tracing::{debug, info, warn};

use crate::dashboard::{DashboardState, Section};
use crate::models::{Coin, CoinDetail, DEFAULT_HISTORY_DAYS};

/// Prompt de la barre de recherche
pub const SEARCH_PROMPT: &str = "Search: ";

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : liste, favoris, répartition de la market cap
    Dashboard,

    /// Grille de line charts (historique synthétique)
    Charts,

    /// Fiche détaillée du coin sélectionné
    Detail,

    /// Mode saisie de la recherche
    /// - Enter valide, ESC annule (requête effacée)
    SearchInput,
}

/// État de la fiche détaillée
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Requête en cours pour cet id
    Loading(String),

    /// Fiche reçue
    Loaded(Box<CoinDetail>),

    /// Échec (réseau, statut HTTP, id inconnu)
    Failed { id: String, message: String },
}

impl DetailState {
    /// Id du coin concerné, quel que soit l'état
    pub fn id(&self) -> &str {
        match self {
            DetailState::Loading(id) => id,
            DetailState::Loaded(detail) => &detail.id,
            DetailState::Failed { id, .. } => id,
        }
    }
}

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - App décide QUOI charger, le worker décide COMMENT (async, réseau)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Recharger la liste de marché
    RefreshMarket,

    /// Charger la fiche détaillée d'un coin
    LoadDetail { id: String },
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Cœur du dashboard (coins, recherche, favoris, pages)
    pub dashboard: DashboardState,

    /// Index sélectionné dans la page visible de la liste principale
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' => true, deuxième => quit
    pub confirm_quit: bool,

    /// Buffer de saisie de la recherche
    pub input_buffer: String,

    /// Prompt affiché en mode saisie
    pub input_prompt: String,

    /// Fiche détaillée ouverte (None hors de l'écran Detail)
    pub detail: Option<DetailState>,

    /// Fenêtre de l'historique synthétique des line charts, en jours
    pub history_days: u32,
}

impl App {
    /// Crée l'application autour d'un dashboard déjà initialisé
    pub fn new(dashboard: DashboardState) -> Self {
        Self {
            running: true,
            dashboard,
            selected_index: 0,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
            detail: None,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Fixe la fenêtre des line charts (LAZYCOIN_HISTORY_DAYS)
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Sélection
    // ========================================================================

    /// Navigue vers le haut dans la page visible
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas, sans dépasser la page visible
    pub fn navigate_down(&mut self) {
        let max_index = self.dashboard.visible_coins().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Coin sélectionné dans la page visible
    pub fn selected_coin(&self) -> Option<&Coin> {
        self.dashboard.visible_coins().get(self.selected_index)
    }

    /// Ramène la sélection dans la page visible (liste rétrécie)
    fn clamp_selection(&mut self) {
        let max_index = self.dashboard.visible_coins().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Page suivante d'une zone ; la sélection repart en haut pour Main
    pub fn next_page(&mut self, section: Section) {
        self.dashboard.next_page(section);
        if section == Section::Main {
            self.selected_index = 0;
        }
    }

    /// Page précédente d'une zone ; la sélection repart en haut pour Main
    pub fn prev_page(&mut self, section: Section) {
        self.dashboard.prev_page(section);
        if section == Section::Main {
            self.selected_index = 0;
        }
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    /// Bascule le favori du coin sélectionné
    pub fn toggle_selected_favorite(&mut self) {
        let Some(id) = self.selected_coin().map(|coin| coin.id.clone()) else {
            debug!("No coin selected, nothing to toggle");
            return;
        };

        self.dashboard.toggle_favorite(&id);
        info!(id = %id, favorite = self.dashboard.is_favorite(&id), "User toggled favorite");
    }

    /// Bascule le favori du coin affiché dans la fiche détail
    ///
    /// Fonctionne aussi pendant le chargement ou après une erreur :
    /// l'id est connu dès l'ouverture de la fiche.
    pub fn toggle_detail_favorite(&mut self) {
        let Some(id) = self.detail_id().map(str::to_string) else {
            debug!("No detail open, nothing to toggle");
            return;
        };

        self.dashboard.toggle_favorite(&id);
        info!(id = %id, favorite = self.dashboard.is_favorite(&id), "User toggled favorite from detail");
    }

    /// Id du coin de la fiche détail ouverte
    pub fn detail_id(&self) -> Option<&str> {
        if !self.is_on_detail() {
            return None;
        }
        self.detail.as_ref().map(DetailState::id)
    }

    /// Le coin de la fiche détail est-il en favori ?
    pub fn is_detail_favorite(&self) -> bool {
        self.detail_id()
            .is_some_and(|id| self.dashboard.is_favorite(id))
    }

    // ========================================================================
    // Données de marché
    // ========================================================================

    /// Demande un rechargement de la liste
    ///
    /// None si un chargement est déjà en cours.
    pub fn request_refresh(&mut self) -> Option<AppCommand> {
        if self.dashboard.is_loading() {
            debug!("Refresh already in progress, ignoring");
            return None;
        }
        self.dashboard.begin_refresh();
        Some(AppCommand::RefreshMarket)
    }

    /// Applique une liste reçue du worker
    pub fn apply_market_list(&mut self, coins: Vec<Coin>) {
        self.dashboard.apply_market_list(coins);
        self.clamp_selection();
    }

    /// Le worker n'a pas pu charger la liste
    pub fn fail_market_list(&mut self, message: impl Into<String>) {
        self.dashboard.fail_refresh(message);
    }

    // ========================================================================
    // Fiche détaillée
    // ========================================================================

    /// Ouvre la fiche du coin sélectionné
    pub fn open_selected_detail(&mut self) -> Option<AppCommand> {
        let id = self.selected_coin()?.id.clone();
        info!(id = %id, "User opened detail view");

        self.detail = Some(DetailState::Loading(id.clone()));
        self.current_screen = Screen::Detail;
        Some(AppCommand::LoadDetail { id })
    }

    /// Applique une fiche reçue du worker
    ///
    /// Ignorée si l'utilisateur a quitté la fiche ou en a ouvert une autre.
    pub fn apply_detail(&mut self, detail: CoinDetail) {
        if !self.is_awaiting_detail(&detail.id) {
            debug!(id = %detail.id, "Stale detail result, ignoring");
            return;
        }
        self.detail = Some(DetailState::Loaded(Box::new(detail)));
    }

    /// Le worker n'a pas pu charger la fiche
    pub fn fail_detail(&mut self, id: &str, message: impl Into<String>) {
        if !self.is_awaiting_detail(id) {
            debug!(id, "Stale detail error, ignoring");
            return;
        }
        let message = message.into();
        warn!(id, error = %message, "Detail view shows error");
        self.detail = Some(DetailState::Failed {
            id: id.to_string(),
            message,
        });
    }

    fn is_awaiting_detail(&self, id: &str) -> bool {
        self.current_screen == Screen::Detail
            && matches!(&self.detail, Some(DetailState::Loading(pending)) if pending == id)
    }

    // ========================================================================
    // Écrans
    // ========================================================================

    /// Bascule entre le dashboard et la grille de line charts
    pub fn toggle_charts(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Charts => Screen::Dashboard,
            _ => Screen::Charts,
        };
    }

    /// Retour au dashboard (depuis Charts ou Detail)
    pub fn back(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.detail = None;
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_charts(&self) -> bool {
        self.current_screen == Screen::Charts
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Recherche (mode input)
    // ========================================================================

    /// Entre en mode recherche, le buffer reprend la requête courante
    pub fn start_search(&mut self) {
        self.current_screen = Screen::SearchInput;
        self.input_buffer = self.dashboard.query().to_string();
        self.input_prompt = SEARCH_PROMPT.to_string();
    }

    /// Valide la recherche (Search) et retourne au dashboard
    pub fn submit_search(&mut self) {
        let query = std::mem::take(&mut self.input_buffer);
        info!(query = %query, "User submitted search");

        self.dashboard.search(&query);
        self.selected_index = 0;
        self.leave_input();
    }

    /// Annule la recherche (Cancel) : requête effacée, liste complète
    pub fn cancel_search(&mut self) {
        info!("User cancelled search");
        self.input_buffer.clear();
        self.dashboard.cancel_search();
        self.selected_index = 0;
        self.leave_input();
    }

    fn leave_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_prompt.clear();
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::SearchInput
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// Garde la sélection dans la page visible (la page peut avoir
    /// rétréci après un refresh ou un changement de page).
    pub fn tick(&mut self) {
        self.clamp_selection();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::PageSizes;
    use crate::storage::{FavoritesStore, MemoryKeyValueStore};

    fn market() -> Vec<Coin> {
        vec![
            Coin::new("bitcoin", "Bitcoin", 67000.0, 600.0),
            Coin::new("ethereum", "Ethereum", 3500.0, 200.0),
            Coin::new("tether", "Tether", 1.0, 100.0),
            Coin::new("solana", "Solana", 150.0, 50.0),
            Coin::new("bitcoin-cash", "Bitcoin Cash", 480.0, 30.0),
        ]
    }

    fn app() -> App {
        let favorites = FavoritesStore::open(Box::new(MemoryKeyValueStore::new()));
        let sizes = PageSizes { main: 2, favorites: 3, charts: 4 };
        let mut app = App::new(DashboardState::new(favorites, sizes));
        app.apply_market_list(market());
        app
    }

    fn detail(id: &str) -> CoinDetail {
        CoinDetail {
            id: id.to_string(),
            name: id.to_string(),
            symbol: String::new(),
            image_large: None,
            current_price: 1.0,
            market_cap: 1.0,
            high_24h: 1.0,
            low_24h: 1.0,
            total_volume: 1.0,
            price_change_percentage_24h: 0.0,
            price_change_percentage_7d: 0.0,
            price_change_percentage_30d: 0.0,
            circulating_supply: 0.0,
            total_supply: None,
            max_supply: None,
            description: String::new(),
            homepage: None,
            blockchain_site: None,
            genesis_date: None,
            sentiment_votes_up_percentage: None,
            sentiment_votes_down_percentage: None,
            market_cap_rank: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert!(app.is_on_dashboard());
        assert_eq!(app.selected_coin().map(|c| c.id.as_str()), Some("bitcoin"));
    }

    #[test]
    fn test_navigation_is_bounded_by_page() {
        let mut app = app();

        app.navigate_down();
        assert_eq!(app.selected_index, 1);

        // Page de 2 : reste à 1
        app.navigate_down();
        assert_eq!(app.selected_index, 1);

        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_page_change_resets_selection() {
        let mut app = app();
        app.navigate_down();

        app.next_page(Section::Main);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_coin().map(|c| c.id.as_str()), Some("tether"));
    }

    #[test]
    fn test_toggle_selected_favorite() {
        let mut app = app();
        app.navigate_down();

        app.toggle_selected_favorite();
        assert!(app.dashboard.is_favorite("ethereum"));

        app.toggle_selected_favorite();
        assert!(!app.dashboard.is_favorite("ethereum"));
    }

    #[test]
    fn test_search_submit_and_cancel() {
        let mut app = app();

        app.start_search();
        assert!(app.is_in_input_mode());
        for c in "bit".chars() {
            app.append_char(c);
        }
        app.submit_search();

        assert!(app.is_on_dashboard());
        assert_eq!(app.dashboard.query(), "bit");
        assert_eq!(app.dashboard.filtered_coins().len(), 2);

        // Le buffer reprend la requête, Cancel l'efface
        app.start_search();
        assert_eq!(app.input_buffer, "bit");
        app.cancel_search();
        assert_eq!(app.dashboard.query(), "");
        assert_eq!(app.dashboard.filtered_coins().len(), 5);
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_backspace_in_search() {
        let mut app = app();
        app.start_search();
        app.append_char('e');
        app.append_char('x');
        app.backspace();
        assert_eq!(app.input_buffer, "e");
    }

    #[test]
    fn test_refresh_is_not_duplicated() {
        let mut app = app();

        assert_eq!(app.request_refresh(), Some(AppCommand::RefreshMarket));
        assert!(app.dashboard.is_loading());
        assert_eq!(app.request_refresh(), None);

        app.fail_market_list("timeout");
        assert!(!app.dashboard.is_loading());
        assert_eq!(app.dashboard.coins().len(), 5);
        assert_eq!(app.request_refresh(), Some(AppCommand::RefreshMarket));
    }

    #[test]
    fn test_refresh_clamps_selection() {
        let mut app = app();
        app.navigate_down();

        app.apply_market_list(vec![Coin::new("bitcoin", "Bitcoin", 1.0, 1.0)]);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_detail_flow() {
        let mut app = app();

        let command = app.open_selected_detail();
        assert_eq!(
            command,
            Some(AppCommand::LoadDetail { id: "bitcoin".to_string() })
        );
        assert!(app.is_on_detail());
        assert_eq!(app.detail, Some(DetailState::Loading("bitcoin".to_string())));

        app.apply_detail(detail("bitcoin"));
        assert!(matches!(app.detail, Some(DetailState::Loaded(_))));

        app.back();
        assert!(app.is_on_dashboard());
        assert_eq!(app.detail, None);
    }

    #[test]
    fn test_toggle_favorite_from_detail() {
        let mut app = app();
        assert!(!app.is_detail_favorite());

        app.open_selected_detail();
        assert_eq!(app.detail_id(), Some("bitcoin"));

        // Pendant le chargement
        app.toggle_detail_favorite();
        assert!(app.dashboard.is_favorite("bitcoin"));
        assert!(app.is_detail_favorite());

        // Fiche chargée
        app.apply_detail(detail("bitcoin"));
        app.toggle_detail_favorite();
        assert!(!app.dashboard.is_favorite("bitcoin"));
        assert!(!app.is_detail_favorite());

        // Hors fiche : aucun effet
        app.back();
        assert_eq!(app.detail_id(), None);
        app.toggle_detail_favorite();
        assert!(!app.dashboard.is_favorite("bitcoin"));
    }

    #[test]
    fn test_stale_detail_is_ignored() {
        let mut app = app();
        app.open_selected_detail();

        // Résultat pour un autre id
        app.apply_detail(detail("ethereum"));
        assert_eq!(app.detail, Some(DetailState::Loading("bitcoin".to_string())));

        // L'utilisateur est revenu en arrière avant la réponse
        app.back();
        app.apply_detail(detail("bitcoin"));
        assert_eq!(app.detail, None);
        app.fail_detail("bitcoin", "boom");
        assert_eq!(app.detail, None);
    }

    #[test]
    fn test_detail_failure() {
        let mut app = app();
        app.open_selected_detail();

        app.fail_detail("bitcoin", "coin not found: bitcoin");
        match &app.detail {
            Some(state @ DetailState::Failed { message, .. }) => {
                assert_eq!(state.id(), "bitcoin");
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected detail state: {:?}", other),
        }
    }

    #[test]
    fn test_open_detail_on_empty_list() {
        let favorites = FavoritesStore::open(Box::new(MemoryKeyValueStore::new()));
        let mut app = App::new(DashboardState::new(favorites, PageSizes::default()));

        assert_eq!(app.open_selected_detail(), None);
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_toggle_charts_and_quit_confirmation() {
        let mut app = app();

        app.toggle_charts();
        assert!(app.is_on_charts());
        app.toggle_charts();
        assert!(app.is_on_dashboard());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
