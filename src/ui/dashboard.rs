// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Header (statut), liste paginée des coins, panneau des favoris,
// répartition de la market cap du top 10, footer (raccourcis ou recherche)
//
// CONCEPTS RATATUI :
// 1. Layout imbriqué : vertical (header/contenu/footer) puis horizontal
// 2. List : une ligne par coin, la sélection en REVERSED
// 3. BarChart horizontal : remplace le donut de répartition
//
// Le rendu lit un DashboardSnapshot : jamais de mutation pendant draw()
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::dashboard::{CoinView, DashboardSnapshot, MarketShare, PageInfo, MARKET_SHARE_TOP_N};
use crate::models::{format_usd, Coin};

/// Dessine le dashboard (liste, favoris, répartition)
pub fn render_dashboard(frame: &mut Frame, app: &App) {
    let snapshot = app.dashboard.snapshot();
    let chunks = create_layout(frame.size());

    render_header(frame, &snapshot, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_coin_list(frame, app, &snapshot, columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(favorites_height(&snapshot)),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    render_favorites(frame, &snapshot, side[0]);
    render_market_share(
        frame,
        &app.dashboard.market_share(MARKET_SHARE_TOP_N),
        side[1],
    );

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[2]);
    } else {
        render_footer(frame, app, chunks[2]);
    }
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================

/// Crée le layout principal (header, content, footer)
///
/// CONCEPT RUST : Rc<[T]> vs Vec<T>
/// - Layout::split() retourne Rc<[Rect]>, converti en Vec
pub(crate) fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(4), // Footer : shortcuts ou saisie
        ])
        .split(area)
        .to_vec()
}

/// Hauteur du panneau favoris : une ligne par slot + bordures + pagination
fn favorites_height(snapshot: &DashboardSnapshot) -> u16 {
    let rows = snapshot.favorites.len().max(1) as u16;
    rows + 3
}

// ============================================================================
// Header : Titre et statut
// ============================================================================

fn render_header(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyCoin ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(vec![status_line(snapshot)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne de statut : nombre de coins, requête, chargement ou erreur
pub(crate) fn status_line(snapshot: &DashboardSnapshot) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{} coins", snapshot.total_coins),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];

    if !snapshot.query.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("🔍 \"{}\" ({} match)", snapshot.query, snapshot.filtered_count),
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::raw("  "));
    if snapshot.loading {
        spans.push(Span::styled(
            "⟳ Loading...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::SLOW_BLINK),
        ));
    } else if let Some(error) = &snapshot.last_error {
        spans.push(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(at) = snapshot.last_refresh {
        spans.push(Span::styled(
            format!("Updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ));
    }

    Line::from(spans)
}

// ============================================================================
// Pagination
// ============================================================================

/// "◀ Page X of Y ▶", flèche grisée quand la page n'existe pas
pub(crate) fn page_line(info: &PageInfo) -> Line<'static> {
    let arrow = |symbol: &'static str, enabled: bool| {
        let color = if enabled { Color::Yellow } else { Color::DarkGray };
        Span::styled(symbol, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    Line::from(vec![
        arrow("◀ ", info.has_prev),
        Span::styled(
            format!("Page {} of {}", info.current_page, info.total_pages),
            Style::default().fg(Color::Gray),
        ),
        arrow(" ▶", info.has_next),
    ])
}

/// Pagination en bas du cadre, centrée
pub(crate) fn page_title(info: &PageInfo) -> Title<'static> {
    Title::from(page_line(info))
        .position(Position::Bottom)
        .alignment(Alignment::Center)
}

// ============================================================================
// Liste principale
// ============================================================================

fn render_coin_list(frame: &mut Frame, app: &App, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Market ")
        .title(page_title(&snapshot.main_page));

    if snapshot.visible.is_empty() {
        let message = if snapshot.loading && snapshot.total_coins == 0 {
            "Chargement du marché..."
        } else if !snapshot.query.is_empty() {
            "Aucun coin ne correspond à la recherche"
        } else {
            "Aucun coin à afficher"
        };

        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = snapshot
        .visible
        .iter()
        .enumerate()
        .map(|(index, view)| coin_item(view, index == app.selected_index))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Une ligne de la liste : étoile, nom, prix, market cap, variation 24h
fn coin_item(view: &CoinView, selected: bool) -> ListItem<'static> {
    let style = change_style(&view.coin);

    let mut spans = vec![Span::raw(format!(" {}  ", view.coin.display(view.is_favorite)))];
    if let Some(change) = view.coin.price_change_percentage_24h {
        let arrow = if change >= 0.0 { "▲" } else { "▼" };
        spans.push(Span::styled(format!("{} {:+.2}%", arrow, change), style));
    }

    let item = ListItem::new(Line::from(spans));
    if selected {
        item.style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        )
    } else {
        item
    }
}

fn change_style(coin: &Coin) -> Style {
    match coin.price_change_percentage_24h {
        Some(_) if coin.is_positive() => Style::default().fg(Color::Green),
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::Gray),
    }
}

// ============================================================================
// Favoris
// ============================================================================

fn render_favorites(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" ★ Favorites ({}) ", snapshot.favorites_count))
        .title(page_title(&snapshot.favorites_page));

    if snapshot.favorites.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "[f] pour ajouter le coin sélectionné",
            Style::default().fg(Color::Gray),
        )))
        .block(block)
        .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = snapshot
        .favorites
        .iter()
        .map(|coin| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<16}", coin.name), Style::default().fg(Color::White)),
                Span::styled(format_usd(coin.current_price), change_style(coin)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Répartition de la market cap
// ============================================================================
// CONCEPT RATATUI : BarChart
// - Un Bar par coin, valeur entière (u64) = part en dixièmes de pourcent
// - text_value : le texte affiché dans la barre ("42.1%")
// ============================================================================

fn render_market_share(frame: &mut Frame, shares: &[MarketShare], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Market cap share (top {}) ", MARKET_SHARE_TOP_N));

    if shares.is_empty() {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    }

    let bars: Vec<Bar> = shares
        .iter()
        .map(|share| {
            Bar::default()
                .value((share.share * 10.0).round() as u64)
                .label(Line::from(share.name.clone()))
                .text_value(format!("{:.1}%", share.share))
                .style(Style::default().fg(Color::Magenta))
                .value_style(Style::default().fg(Color::Black).bg(Color::Magenta))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn key_span(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

/// Dessine le footer avec les raccourcis clavier
pub(crate) fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = if app.is_awaiting_quit_confirmation() {
        vec![Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])]
    } else {
        vec![
            Line::from(vec![
                key_span("[↑↓]"),
                Span::raw(" Select  "),
                key_span("[←→ h l]"),
                Span::raw(" Page  "),
                key_span("[H L]"),
                Span::raw(" Favorites page  "),
                key_span("[Enter]"),
                Span::raw(" Detail  "),
                key_span("[f]"),
                Span::raw(" Favorite"),
            ]),
            Line::from(vec![
                key_span("[/]"),
                Span::raw(" Search  "),
                key_span("[c]"),
                Span::raw(" Charts  "),
                key_span("[r]"),
                Span::raw(" Refresh  "),
                key_span("[q]"),
                Span::raw(" Quit"),
            ]),
        ]
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Input Mode : Barre de recherche
// ============================================================================

/// Footer en mode recherche : prompt, buffer, actions Search / Cancel
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.clone(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Search  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardState, PageSizes};
    use crate::storage::{FavoritesStore, MemoryKeyValueStore};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_page_line() {
        let info = PageInfo {
            current_page: 2,
            total_pages: 5,
            has_prev: true,
            has_next: true,
        };
        assert_eq!(line_text(&page_line(&info)), "◀ Page 2 of 5 ▶");

        let first = PageInfo {
            current_page: 1,
            total_pages: 1,
            has_prev: false,
            has_next: false,
        };
        let line = page_line(&first);
        assert_eq!(line.spans[0].style.fg, Some(Color::DarkGray));
        assert_eq!(line.spans[2].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_status_line() {
        let favorites = FavoritesStore::open(Box::new(MemoryKeyValueStore::new()));
        let mut state = DashboardState::new(favorites, PageSizes::default());

        state.begin_refresh();
        assert!(line_text(&status_line(&state.snapshot())).contains("Loading"));

        state.fail_refresh("HTTP 429");
        let text = line_text(&status_line(&state.snapshot()));
        assert!(text.starts_with("0 coins"));
        assert!(text.contains("HTTP 429"));

        state.apply_market_list(vec![Coin::new("bitcoin", "Bitcoin", 1.0, 1.0)]);
        state.search("bit");
        let text = line_text(&status_line(&state.snapshot()));
        assert!(text.contains("\"bit\" (1 match)"));
        assert!(text.contains("Updated"));
    }
}
