// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine la page unique du dashboard en utilisant les widgets de ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
//
// La couche de présentation LIT l'état (App) et ne déclenche jamais
// de logique métier : pas de fetch, pas de mutation du cache
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::ui::chart;

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern matching sur app.current_screen
/// - Le compilateur garantit l'exhaustivité (tous les cas gérés)
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Dashboard => render_dashboard(frame, app, false),
        Screen::InputMode => {
            // Dashboard en fond + ligne de saisie en bas
            render_dashboard(frame, app, true);
        }
    }
}

/// Dessine le dashboard (page unique)
fn render_dashboard(frame: &mut Frame, app: &App, input_mode: bool) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_market_section(frame, app, chunks[1]);
    render_pulse_grid(frame, app, chunks[2]);
    render_balance_panel(frame, app, chunks[3]);

    if input_mode {
        render_input_line(frame, app, chunks[4]);
    } else {
        render_footer(frame, app, chunks[4]);
    }
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================
// CONCEPT RATATUI : Layout
// - split() découpe un Rect en plusieurs zones
// - Constraints définissent les tailles (Length, Min, Percentage)
// ============================================================================

/// Crée le layout principal (header, chart, pulse, balance, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : titre + statut wallet
            Constraint::Min(10),   // Graphique 7 jours
            Constraint::Length(3), // Pulse grid (stats marché)
            Constraint::Length(5), // Panneau balance
            Constraint::Length(3), // Footer : raccourcis ou saisie
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : Titre et statut du wallet
// ============================================================================

/// Dessine le header avec le titre et le statut de connexion
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" NEXA ")
        .title_alignment(Alignment::Center);

    // Statut de connexion du wallet
    // CONCEPT RATATUI : Span et Line
    // - Span : morceau de texte avec style
    // - Line : une ligne composée de Spans
    let status = match app.session.current() {
        Some(id) => Line::from(vec![
            Span::styled("⦿ ", Style::default().fg(Color::Green)),
            Span::styled(
                id.short(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(Span::styled(
            "○ No wallet connected",
            Style::default().fg(Color::Gray),
        )),
    };

    let paragraph = Paragraph::new(vec![status])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Section marché : headline de prix + graphique
// ============================================================================

/// Dessine la section marché (prix, variation, graphique 7 jours)
fn render_market_section(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Ligne de prix
            Constraint::Min(0),    // Graphique
        ])
        .split(area)
        .to_vec();

    // Headline : prix actuel + variation 7 jours
    let market = &app.market;
    let color = if market.is_positive() {
        Color::Green
    } else {
        Color::Red
    };
    let arrow = if market.is_positive() { "▲" } else { "▼" };

    let headline = Line::from(vec![
        Span::styled(
            format!(" ${:.1} ", market.price_usd),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} {:+.1}%", arrow, market.change_7d_percent),
            Style::default().fg(color),
        ),
    ]);

    frame.render_widget(Paragraph::new(vec![headline]), chunks[0]);

    chart::render_price_chart(frame, market, chunks[1]);
}

// ============================================================================
// Pulse grid : statistiques marché
// ============================================================================

/// Dessine la grille de statistiques (MC, TVL, Vol, etc.)
///
/// CONCEPT RATATUI : Layout horizontal
/// - Une colonne de largeur égale par statistique
fn render_pulse_grid(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.market.stats;
    if stats.is_empty() {
        return;
    }

    let percent = (100 / stats.len()) as u16;
    let constraints: Vec<Constraint> = stats
        .iter()
        .map(|_| Constraint::Percentage(percent))
        .collect();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec();

    for (stat, column) in stats.iter().zip(columns) {
        // La statistique mise en avant a sa propre couleur
        let value_style = if stat.highlight {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        };

        let line = Line::from(vec![
            Span::styled(
                format!("{} ", stat.label),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(stat.value, value_style),
        ]);

        let paragraph = Paragraph::new(vec![line])
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, column);
    }
}

// ============================================================================
// Panneau balance
// ============================================================================

/// Dessine le panneau de balance du wallet
///
/// Le contenu suit strictement l'état du cache :
/// - Pas de wallet : placeholder + invite à connecter
/// - Pending : indicateur de chargement
/// - Fresh : valeur en SOL + horodatage
/// - Error : placeholder (jamais zéro ni une valeur périmée) + message
fn render_balance_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 💰 Balance ");

    let lines = match (app.session.current(), app.balance_record()) {
        (None, _) => vec![
            Line::from(Span::styled(
                "—",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Press 'c' to connect a wallet",
                Style::default().fg(Color::Gray),
            )),
        ],
        (Some(_), Some(record)) if record.is_fresh() => {
            let updated = record
                .fetched_at
                .map(|t| format!("Updated {}", t.format("%H:%M:%S UTC")))
                .unwrap_or_default();

            vec![
                Line::from(Span::styled(
                    record.display(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(updated, Style::default().fg(Color::Gray))),
            ]
        }
        (Some(_), Some(record)) if record.is_error() => vec![
            Line::from(Span::styled(
                "—",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                record.error_message().unwrap_or_default(),
                Style::default().fg(Color::Gray),
            )),
        ],
        // Pending (ou record pas encore installé par la boucle)
        _ => vec![
            Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::Yellow),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis clavier et confirmations
// ============================================================================

/// Dessine le footer avec les raccourcis (ou la confirmation en attente)
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    // Les confirmations two-step remplacent les raccourcis
    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(Span::styled(
            "Press 'q' again to quit",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else if app.is_awaiting_disconnect_confirmation() {
        Line::from(Span::styled(
            "Press 'd' again to disconnect",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled("[c]", Style::default().fg(Color::Yellow)),
            Span::raw(" Connect  "),
            Span::styled("[d]", Style::default().fg(Color::Yellow)),
            Span::raw(" Disconnect  "),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw(" Refresh  "),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Mode input : saisie de l'adresse du wallet
// ============================================================================

/// Dessine la ligne de saisie (remplace le footer en mode input)
///
/// CONCEPT : Modal input (Vim-like)
/// - Prompt + buffer + curseur
/// - Enter valide, ESC annule
fn render_input_line(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Connect wallet (Enter: ok, ESC: cancel) ");

    let mut spans = vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(app.input_buffer.as_str()),
        // Curseur bloc
        Span::styled("█", Style::default().fg(Color::White)),
    ];

    // Erreur de saisie éventuelle (adresse vide)
    if let Some(error) = &app.input_error {
        spans.push(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)]).block(block);

    frame.render_widget(paragraph, area);
}
