// ============================================================================
// Chart - Rendu du graphique de prix 7 jours
// ============================================================================
// Affiche un graphique ligne (line chart) des points de prix statiques
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::models::MarketSnapshot;

/// Dessine le graphique de prix 7 jours
///
/// CONCEPT RUST : Iterator chaining
/// - .iter() : itère sur les points de prix
/// - .enumerate() : ajoute l'index (axe X)
/// - .map() : transforme en points (x, y)
/// - .collect() : collecte en Vec
pub fn render_price_chart(frame: &mut Frame, market: &MarketSnapshot, area: Rect) {
    let points: Vec<(f64, f64)> = market
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.price))
        .collect();

    if points.is_empty() {
        return;
    }

    // Bornes des axes avec une marge de 5% pour que le graphique respire
    let (min_price, max_price) = market.price_bounds();
    let margin = (max_price - min_price) * 0.05;
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    // Couleur selon la tendance 7 jours
    let color = if market.is_positive() {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name("SOL")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    // Axe X : un label par jour de la semaine
    let day_labels: Vec<Span> = market
        .points
        .iter()
        .map(|p| Span::raw(p.day))
        .collect();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len() - 1) as f64])
        .labels(day_labels);

    let y_axis = Axis::default()
        .title("Prix ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.0}", y_min)),
            Span::raw(format!("${:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" 📈 SOL - 7D Performance "),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}
