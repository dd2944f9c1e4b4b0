// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture du clavier avec timeout, et helpers pour reconnaître chaque touche
// du dashboard (voir la table des raccourcis dans le footer)
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Polling avec timeout : la boucle ne bloque jamais plus d'un tick
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Durée d'un tick par défaut
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(250);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (aucune touche pendant tick_rate)
    Tick,

    /// Terminal redimensionné : on redessine au prochain tour
    Resize,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE)
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(tick_rate) attend au plus un tick
    /// - Pas d'événement => Event::Tick
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        let event = match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            CrosstermEvent::Resize(_, _) => Event::Resize,
            _ => Event::Tick,
        };
        Ok(event)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helper : Convertir KeyEvent en action
// ============================================================================
// CONCEPT RUST : Pattern matching avancé
// - Match sur KeyCode pour identifier la touche
// - Peut aussi matcher sur les modifiers (Ctrl, Alt, Shift)
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    // CONCEPT RUST : Pattern matching avec if let
    // - Destructure Event::Key et vérifie le KeyCode en une ligne
    // - Plus élégant que match pour un seul cas
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Vérifie si l'événement est Espace
pub fn is_space_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(' '))
    } else {
        false
    }
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le haut ou 'k' (vim)
///
/// CONCEPT RUST : Multiple patterns avec |
/// - KeyCode::Up | KeyCode::Char('k') : match l'un ou l'autre
/// - Support des touches Vim pour les power users !
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'l' ou → (page suivante de la liste)
pub fn is_next_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Right | KeyCode::Char('l'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'h' ou ← (page précédente de la liste)
pub fn is_prev_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Left | KeyCode::Char('h'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'L' (page suivante des favoris)
pub fn is_next_favorites_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('L'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'H' (page précédente des favoris)
pub fn is_prev_favorites_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('H'))
    } else {
        false
    }
}

/// Vérifie si l'événement est ']' (page suivante des line charts)
pub fn is_next_charts_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(']'))
    } else {
        false
    }
}

/// Vérifie si l'événement est '[' (page précédente des line charts)
pub fn is_prev_charts_page_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('['))
    } else {
        false
    }
}

/// Vérifie si l'événement est '/' (ouvrir la recherche)
///
/// CONCEPT : Vim-style '/' for search
pub fn is_search_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('/'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'f' (basculer le favori)
pub fn is_favorite_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('f') | KeyCode::Char('F'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'r' (recharger la liste)
pub fn is_refresh_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'c' (écran des line charts)
pub fn is_charts_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Vérifie si l'événement est un caractère imprimable (saisie de recherche)
///
/// Ctrl/Alt + touche ne sont pas de la saisie.
pub fn is_text_char_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(c) if !c.is_control())
            && !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    } else {
        false
    }
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_page_keys_are_distinct() {
        let lower_l = key(KeyCode::Char('l'));
        let upper_l = key(KeyCode::Char('L'));

        assert!(is_next_page_event(&lower_l));
        assert!(!is_next_favorites_page_event(&lower_l));
        assert!(is_next_favorites_page_event(&upper_l));
        assert!(!is_next_page_event(&upper_l));

        assert!(is_prev_page_event(&key(KeyCode::Left)));
        assert!(is_next_charts_page_event(&key(KeyCode::Char(']'))));
        assert!(is_prev_charts_page_event(&key(KeyCode::Char('['))));
        assert!(is_prev_favorites_page_event(&key(KeyCode::Char('H'))));
    }

    #[test]
    fn test_action_keys() {
        assert!(is_search_event(&key(KeyCode::Char('/'))));
        assert!(is_favorite_event(&key(KeyCode::Char('f'))));
        assert!(is_refresh_event(&key(KeyCode::Char('r'))));
        assert!(is_charts_event(&key(KeyCode::Char('c'))));
        assert!(is_backspace_event(&key(KeyCode::Backspace)));
    }

    #[test]
    fn test_text_char_event() {
        assert!(is_text_char_event(&key(KeyCode::Char(' '))));
        assert!(is_text_char_event(&key(KeyCode::Char('é'))));
        assert!(!is_text_char_event(&key(KeyCode::Enter)));

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!is_text_char_event(&ctrl_c));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('x'))), Some('x'));
    }
}
