// ============================================================================
// Charts - Grille de line charts
// ============================================================================
// Un line chart par coin de la page courante (4 par page par défaut),
// sur un historique synthétique de N jours qui se termine au prix actuel
//
// CONCEPTS RUST :
// 1. Iterator chaining : transformer l'historique en points (x, y)
// 2. fold() : min et max en un seul passage
// 3. chunks() : répartir les coins en lignes de la grille
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use chrono::{Local, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{format_usd, generate_price_history_at, Coin, PriceHistoryPoint};
use crate::ui::dashboard::{create_layout, page_title, render_footer};

/// Nombre de graphiques par ligne de la grille
const CHARTS_PER_ROW: usize = 2;

/// Dessine l'écran des line charts
pub fn render_charts(frame: &mut Frame, app: &App) {
    let snapshot = app.dashboard.snapshot();
    let chunks = create_layout(frame.size());

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            format!("{} jours d'historique simulé  ", app.history_days),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("[ ]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Page  "),
        Span::styled("[ESC]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Retour"),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 📈 Charts ")
            .title_alignment(Alignment::Center)
            .title(page_title(&snapshot.charts_page)),
    )
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    if snapshot.chart_coins.is_empty() {
        render_no_data(frame, chunks[1], "Pas de données à afficher");
    } else {
        // "Aujourd'hui" calculé une fois par rendu : toutes les séries partagent les dates
        let today = Local::now().date_naive();
        render_grid(frame, &snapshot.chart_coins, app.history_days, today, chunks[1]);
    }

    render_footer(frame, app, chunks[2]);
}

/// Découpe la zone en lignes de CHARTS_PER_ROW graphiques
fn render_grid(frame: &mut Frame, coins: &[Coin], days: u32, today: NaiveDate, area: Rect) {
    let rows: Vec<&[Coin]> = coins.chunks(CHARTS_PER_ROW).collect();

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows.len() as u32); rows.len()])
        .split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, CHARTS_PER_ROW as u32); CHARTS_PER_ROW])
            .split(*row_area);

        for (coin, cell) in row.iter().zip(cells.iter()) {
            let history = generate_price_history_at(coin.current_price, &coin.id, days, today);
            render_coin_chart(frame, coin, &history, *cell);
        }
    }
}

// ============================================================================
// Graphique d'un coin
// ============================================================================

/// Points (x, y) : x = index du jour, y = prix
fn chart_points(history: &[PriceHistoryPoint]) -> Vec<(f64, f64)> {
    history
        .iter()
        .enumerate()
        .map(|(i, point)| (i as f64, point.price))
        .collect()
}

/// Bornes de l'axe Y avec une marge de 5%
///
/// Série plate (tous les prix égaux) : marge de 1% du prix pour garder
/// une hauteur non nulle.
fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min_price, max_price) = points.iter().fold(
        (f64::MAX, f64::MIN),
        |(min, max), &(_x, y)| (min.min(y), max.max(y)),
    );

    let spread = max_price - min_price;
    let margin = if spread > 0.0 {
        spread * 0.05
    } else {
        (max_price.abs() * 0.01).max(f64::EPSILON)
    };

    [(min_price - margin).max(0.0), max_price + margin]
}

fn render_coin_chart(frame: &mut Frame, coin: &Coin, history: &[PriceHistoryPoint], area: Rect) {
    let points = chart_points(history);
    if points.is_empty() {
        render_no_data(frame, area, &format!("Pas d'historique pour {}", coin.name));
        return;
    }

    let [y_min, y_max] = y_bounds(&points);

    // Tendance de la série simulée : premier point vs dernier
    let first = points[0].1;
    let last = points[points.len() - 1].1;
    let color = if last >= first { Color::Green } else { Color::Red };

    let datasets = vec![Dataset::default()
        .name(coin.name.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let date_label = |point: Option<&PriceHistoryPoint>| {
        Span::raw(point.map(|p| p.date.format("%d/%m").to_string()).unwrap_or_default())
    };

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len() - 1) as f64])
        .labels(vec![
            date_label(history.first()),
            date_label(history.get(history.len() / 2)),
            date_label(history.last()),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_usd(y_min)),
            Span::raw(format_usd(y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} {} ", coin.name, format_usd(coin.current_price))),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

/// Affiche un message quand il n'y a pas de données à afficher
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled("[ESC] Retour", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
