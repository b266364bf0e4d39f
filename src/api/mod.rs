// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les clients réseau de l'application
// (connexion au ledger distant)
// ============================================================================

pub mod ledger;  // Client JSON-RPC du ledger

// Re-export des types principaux
pub use ledger::{BalanceSource, LedgerConnection};
