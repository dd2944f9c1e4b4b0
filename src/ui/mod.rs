// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Grille de line charts
pub mod dashboard; // Liste, favoris, répartition, recherche
pub mod detail;    // Fiche détaillée d'un coin
pub mod events;    // Gestion des événements clavier

use ratatui::Frame;

use crate::app::{App, Screen};

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'écran courant
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit que chaque Screen a un rendu
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        // La recherche se saisit dans le footer du dashboard
        Screen::Dashboard | Screen::SearchInput => dashboard::render_dashboard(frame, app),
        Screen::Charts => chart::render_charts(frame, app),
        Screen::Detail => detail::render_detail(frame, app),
    }
}
