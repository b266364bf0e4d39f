// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod wallet;  // Déclaration du module wallet (fichier wallet.rs)
pub mod balance; // Déclaration du module balance (fichier balance.rs)
pub mod market;  // Déclaration du module market (fichier market.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use nexadash::models::wallet::WalletIdentifier;
// On peut faire : use nexadash::models::WalletIdentifier;
pub use balance::{format_sol, BalanceRecord, FetchError, FetchStatus, LAMPORTS_PER_SOL};
pub use market::{MarketSnapshot, MarketStat, PricePoint};
pub use wallet::WalletIdentifier;
