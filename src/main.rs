// ============================================================================
// LazyCoin - Dashboard crypto dans le terminal
// ============================================================================
// Programme TUI : top des cryptomonnaies par market cap (CoinGecko),
// recherche, favoris persistés, line charts simulés, fiche détaillée
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread : les appels réseau ne bloquent jamais l'UI
// 4. Arc<Mutex<>> : état partagé entre l'event loop et le rendu
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazycoin::api::{CoinGeckoClient, MarketDataSource};
use lazycoin::app::{App, AppCommand};
use lazycoin::config::Config;
use lazycoin::dashboard::{DashboardState, PageSizes, Section};
use lazycoin::storage::{FavoritesStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use lazycoin::ui::{events::EventHandler, render, Event};
use lazycoin::worker::{spawn_background_worker, AppResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier, rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans LAZYCOIN_LOG_DIR (par défaut
/// ~/.local/share/lazycoin/logs/lazycoin.log sous Linux)
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/lazycoin/logs/lazycoin.log
/// RUST_LOG=lazycoin=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazycoin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prioritaire ; par défaut debug pour lazycoin, info pour le reste
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycoin=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env().context("Configuration invalide")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, market_size = config.market_size, "LazyCoin starting up");

    // Favoris : chargés une fois ici, possédés ensuite par le DashboardState
    let favorites = FavoritesStore::open(open_storage(&config));
    let dashboard = DashboardState::new(favorites, PageSizes::from(&config));
    let app = Arc::new(Mutex::new(
        App::new(dashboard).with_history_days(config.history_days),
    ));

    let source: Arc<dyn MarketDataSource> = Arc::new(
        CoinGeckoClient::new(&config).context("Échec de la création du client CoinGecko")?,
    );

    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : commandes vers le worker
    // - result_tx/rx : résultats du worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(command_rx, result_tx, source)
        .context("Échec du lancement du worker")?;

    // Premier chargement de la liste, affichée dès réception
    if let Some(command) = app.lock().unwrap().request_refresh() {
        send_command(&command_tx, command);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // command_tx a été droppé par run() : le worker sort de sa boucle
    // dès que la requête en cours (bornée par le timeout HTTP) se termine
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Surface de persistance des favoris
///
/// Répertoire de données inutilisable => favoris en mémoire pour la session
fn open_storage(config: &Config) -> Box<dyn KeyValueStore> {
    match std::fs::create_dir_all(&config.data_dir) {
        Ok(()) => {
            info!(data_dir = ?config.data_dir, "Favorites persisted on disk");
            Box::new(FileKeyValueStore::new(&config.data_dir))
        }
        Err(e) => {
            warn!(data_dir = ?config.data_dir, error = %e, "Data directory unavailable, favorites kept in memory");
            Box::new(MemoryKeyValueStore::new())
        }
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Mettre à jour l'état (tick)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_iter
        // - Vide tous les résultats arrivés depuis le dernier tour
        for result in result_rx.try_iter() {
            let mut app_lock = app.lock().unwrap();
            apply_result(&mut app_lock, result);
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                let mut app_lock = app.lock().unwrap();
                if let Some(command) = handle_event(&mut app_lock, event) {
                    send_command(&command_tx, command);
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read terminal event");
            }
        }

        // ========================================
        // 3. UPDATE : Met à jour l'état
        // ========================================
        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick();
        }
    }

    Ok(())
}

/// Applique un résultat du worker à l'état
fn apply_result(app: &mut App, result: AppResult) {
    match result {
        AppResult::MarketLoaded(coins) => app.apply_market_list(coins),
        AppResult::MarketFailed(error) => app.fail_market_list(error),
        AppResult::DetailLoaded(detail) => app.apply_detail(*detail),
        AppResult::DetailFailed { id, error } => app.fail_detail(&id, error),
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Navigation contextuelle selon l'écran actuel
/// - Retourne la commande éventuelle à envoyer au worker
fn handle_event(app: &mut App, event: Event) -> Option<AppCommand> {
    use lazycoin::ui::events::{
        get_char_from_event, is_backspace_event, is_enter_event, is_escape_event, is_quit_event,
        is_text_char_event,
    };

    // ========================================
    // Mode recherche : toutes les touches vont dans la saisie
    // ========================================
    if app.is_in_input_mode() {
        match event {
            Event::Key(_) if is_escape_event(&event) => app.cancel_search(),
            Event::Key(_) if is_enter_event(&event) => app.submit_search(),
            Event::Key(_) if is_backspace_event(&event) => app.backspace(),
            Event::Key(_) if is_text_char_event(&event) => {
                if let Some(c) = get_char_from_event(&event) {
                    app.append_char(c);
                }
            }
            _ => {}
        }
        return None;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step : première pression => confirmation, deuxième => quit
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
            None
        }

        Event::Key(_) => {
            // Toute autre touche annule la confirmation de quit
            app.cancel_quit();
            handle_key(app, &event)
        }

        Event::Tick | Event::Resize => None,
    }
}

/// Envoie une commande au worker, false s'il ne répond plus
fn send_command(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) -> bool {
    match command_tx.send(command) {
        Ok(()) => true,
        Err(_) => {
            error!("Worker thread disconnected!");
            false
        }
    }
}

/// Touches hors quit et hors mode recherche
fn handle_key(app: &mut App, event: &Event) -> Option<AppCommand> {
    use lazycoin::ui::events::{
        is_backspace_event, is_charts_event, is_down_event, is_enter_event, is_escape_event,
        is_favorite_event, is_next_charts_page_event, is_next_favorites_page_event,
        is_next_page_event, is_prev_charts_page_event, is_prev_favorites_page_event,
        is_prev_page_event, is_refresh_event, is_search_event, is_space_event, is_up_event,
    };

    match event {
        // Retour au dashboard depuis Detail ou Charts
        _ if (is_escape_event(event) || is_backspace_event(event) || is_space_event(event))
            && !app.is_on_dashboard() =>
        {
            debug!("User returned to dashboard");
            app.back();
            None
        }

        _ if is_refresh_event(event) => {
            info!("User requested refresh");
            app.request_refresh()
        }

        _ if is_charts_event(event) && !app.is_on_detail() => {
            app.toggle_charts();
            None
        }

        // Pages des line charts (dashboard et écran Charts)
        _ if is_next_charts_page_event(event) && !app.is_on_detail() => {
            app.next_page(Section::Charts);
            None
        }
        _ if is_prev_charts_page_event(event) && !app.is_on_detail() => {
            app.prev_page(Section::Charts);
            None
        }

        // Sur l'écran Charts, h/l paginent aussi la grille
        _ if is_next_page_event(event) && app.is_on_charts() => {
            app.next_page(Section::Charts);
            None
        }
        _ if is_prev_page_event(event) && app.is_on_charts() => {
            app.prev_page(Section::Charts);
            None
        }

        // Favori depuis la fiche détail
        _ if is_favorite_event(event) && app.is_on_detail() => {
            app.toggle_detail_favorite();
            None
        }

        // Le reste ne concerne que le dashboard
        _ if !app.is_on_dashboard() => None,

        _ if is_search_event(event) => {
            app.start_search();
            None
        }
        _ if is_up_event(event) => {
            app.navigate_up();
            None
        }
        _ if is_down_event(event) => {
            app.navigate_down();
            None
        }
        _ if is_next_page_event(event) => {
            app.next_page(Section::Main);
            None
        }
        _ if is_prev_page_event(event) => {
            app.prev_page(Section::Main);
            None
        }
        _ if is_next_favorites_page_event(event) => {
            app.next_page(Section::Favorites);
            None
        }
        _ if is_prev_favorites_page_event(event) => {
            app.prev_page(Section::Favorites);
            None
        }
        _ if is_favorite_event(event) => {
            app.toggle_selected_favorite();
            None
        }
        _ if is_enter_event(event) => app.open_selected_detail(),
        _ if is_escape_event(event) => {
            // ESC sur le dashboard : efface la recherche active
            if !app.dashboard.query().is_empty() {
                app.cancel_search();
            }
            None
        }

        _ => None,
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de l'initialisation du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use lazycoin::models::Coin;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let favorites = FavoritesStore::open(Box::new(MemoryKeyValueStore::new()));
        let sizes = PageSizes { main: 5, favorites: 3, charts: 4 };
        let mut app = App::new(DashboardState::new(favorites, sizes));
        app.apply_market_list(vec![
            Coin::new("bitcoin", "Bitcoin", 67000.0, 600.0),
            Coin::new("ethereum", "Ethereum", 3500.0, 200.0),
        ]);
        app
    }

    #[test]
    fn test_favorite_key_in_detail_view() {
        let mut app = app();

        let command = handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(command, Some(AppCommand::LoadDetail { id: "bitcoin".to_string() }));
        assert!(app.is_on_detail());

        assert_eq!(handle_event(&mut app, key(KeyCode::Char('f'))), None);
        assert!(app.dashboard.is_favorite("bitcoin"));
        assert!(app.is_on_detail());

        handle_event(&mut app, key(KeyCode::Char('f')));
        assert!(!app.dashboard.is_favorite("bitcoin"));
    }

    #[test]
    fn test_send_command_reports_disconnected_worker() {
        let (command_tx, command_rx) = mpsc::channel();
        assert!(send_command(&command_tx, AppCommand::RefreshMarket));
        assert_eq!(command_rx.recv().ok(), Some(AppCommand::RefreshMarket));

        drop(command_rx);
        assert!(!send_command(&command_tx, AppCommand::RefreshMarket));
    }

    #[test]
    fn test_favorite_key_on_dashboard() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Down));
        handle_event(&mut app, key(KeyCode::Char('f')));

        assert!(app.dashboard.is_favorite("ethereum"));
        assert!(!app.dashboard.is_favorite("bitcoin"));
    }
}
