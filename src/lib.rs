// ============================================================================
// NexaDash - Library
// ============================================================================
// Expose les modules publics pour les tests et le binaire
// ============================================================================

pub mod api;     // Client JSON-RPC du ledger
pub mod app;     // État de l'application
pub mod cache;   // Cache de balance dédupliqué
pub mod models;  // Structures de données
pub mod session; // Session wallet
pub mod ui;      // Interface utilisateur
