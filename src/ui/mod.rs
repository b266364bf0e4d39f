// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu de la page unique du dashboard
pub mod chart;     // Rendu du graphique de prix 7 jours

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
