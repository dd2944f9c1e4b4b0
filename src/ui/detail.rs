// ============================================================================
// Detail - Fiche détaillée d'un coin
// ============================================================================
// Trois états : chargement, fiche reçue, erreur (toujours avec [ESC] Retour)
// Le favori (★/☆) se bascule avec [f] dans les trois états
//
// Fiche : prix et variations, marché (market cap, high/low, volume),
// supply, sentiment, liens, description
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DetailState};
use crate::models::{format_amount, format_usd, CoinDetail};

pub fn render_detail(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let favorite = app.is_detail_favorite();

    match &app.detail {
        Some(DetailState::Loaded(detail)) => render_loaded(frame, detail, favorite, area),
        Some(DetailState::Loading(id)) => render_message(
            frame,
            area,
            &format!(" {} {} ", favorite_star(favorite), id),
            Color::Cyan,
            "⟳ Chargement de la fiche...",
            true,
        ),
        Some(DetailState::Failed { id, message }) => render_message(
            frame,
            area,
            &format!(" ⚠ {} {} ", favorite_star(favorite), id),
            Color::Red,
            message,
            true,
        ),
        None => render_message(frame, area, " ⚠ ", Color::Red, "Aucun coin sélectionné", false),
    }
}

fn favorite_star(favorite: bool) -> &'static str {
    if favorite {
        "★"
    } else {
        "☆"
    }
}

/// Raccourcis de la fiche : [f] n'a de sens que si un coin est ouvert
fn shortcuts_line(with_favorite: bool) -> Line<'static> {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    if with_favorite {
        spans.push(Span::styled("[f]", key_style));
        spans.push(Span::raw(" Favori   "));
    }
    spans.push(Span::styled("[ESC]", key_style));
    spans.push(Span::raw(" Retour"));
    Line::from(spans)
}

fn render_message(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    message: &str,
    with_favorite: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
        Line::from(""),
        shortcuts_line(with_favorite),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_loaded(frame: &mut Frame, detail: &CoinDetail, favorite: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),  // Titre, prix, raccourcis
            Constraint::Length(10), // Marché | supply
            Constraint::Length(3),  // Sentiment
            Constraint::Min(0),     // Description
        ])
        .split(area);

    render_title(frame, detail, favorite, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_market(frame, detail, columns[0]);
    render_supply(frame, detail, columns[1]);

    render_sentiment(frame, detail, chunks[2]);
    render_description(frame, detail, chunks[3]);
}

fn change_span(label: &'static str, change: f64) -> Vec<Span<'static>> {
    let color = if change >= 0.0 { Color::Green } else { Color::Red };
    let arrow = if change >= 0.0 { "▲" } else { "▼" };
    vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(format!("{} {:+.2}%   ", arrow, change), Style::default().fg(color)),
    ]
}

fn render_title(frame: &mut Frame, detail: &CoinDetail, favorite: bool, area: Rect) {
    let rank = detail
        .market_cap_rank
        .map(|rank| format!(" #{}", rank))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(
            " {} {} ({}){} ",
            favorite_star(favorite),
            detail.name,
            detail.symbol.to_uppercase(),
            rank
        ))
        .title_alignment(Alignment::Center);

    let mut changes = change_span("24h ", detail.price_change_percentage_24h);
    changes.extend(change_span("7d ", detail.price_change_percentage_7d));
    changes.extend(change_span("30d ", detail.price_change_percentage_30d));

    let text = vec![
        Line::from(vec![
            Span::styled(
                format_usd(detail.current_price),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
        ]),
        shortcuts_line(true),
        Line::from(changes),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne "label: valeur" alignée
fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn optional(value: Option<f64>) -> String {
    value.map(format_amount).unwrap_or_else(|| "∞".to_string())
}

fn render_market(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let mut lines = vec![
        field("Market cap", format_usd(detail.market_cap)),
        field("24h high", format_usd(detail.high_24h)),
        field("24h low", format_usd(detail.low_24h)),
        field("Volume", format_usd(detail.total_volume)),
    ];

    if let Some(date) = detail.genesis_date {
        lines.push(field("Genesis", date.format("%Y-%m-%d").to_string()));
    }
    if let Some(updated) = detail.last_updated {
        lines.push(field("Last updated", updated.format("%Y-%m-%d %H:%M UTC").to_string()));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Market "),
    );

    frame.render_widget(paragraph, area);
}

fn render_supply(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let mut lines = vec![
        field("Circulating", format_amount(detail.circulating_supply)),
        field("Total", optional(detail.total_supply)),
        field("Max", optional(detail.max_supply)),
    ];

    if let Some(homepage) = &detail.homepage {
        lines.push(field("Homepage", homepage.clone()));
    }
    if let Some(explorer) = &detail.blockchain_site {
        lines.push(field("Explorer", explorer.clone()));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Supply & links "),
    );

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Sentiment
// ============================================================================
// CONCEPT RATATUI : Gauge
// - ratio() entre 0.0 et 1.0, label libre
// ============================================================================

fn render_sentiment(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Sentiment ");

    let Some(up) = detail.sentiment_votes_up_percentage else {
        frame.render_widget(
            Paragraph::new(Span::styled("Pas de votes", Style::default().fg(Color::Gray)))
                .block(block)
                .alignment(Alignment::Center),
            area,
        );
        return;
    };

    let down = detail.sentiment_votes_down_percentage.unwrap_or(100.0 - up);
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Red))
        .ratio((up / 100.0).clamp(0.0, 1.0))
        .label(format!("▲ {:.1}%  ▼ {:.1}%", up, down));

    frame.render_widget(gauge, area);
}

fn render_description(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let text = if detail.description.is_empty() {
        "Pas de description".to_string()
    } else {
        detail.description.clone()
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" About "),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
