// ============================================================================
// Structures : BalanceRecord, FetchStatus, FetchError
// ============================================================================
// Représente la balance cachée d'un wallet et son cycle de vie
//
// CONCEPTS RUST :
// 1. Enum avec données : FetchStatus porte l'erreur dans son variant
// 2. thiserror : dérive Display + Error pour une taxonomie typée
// 3. u64 pour les lamports : la plus petite unité, toujours ≥ 0
// ============================================================================

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::wallet::WalletIdentifier;

/// Nombre de lamports dans un SOL (unité de base à 9 décimales)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Erreurs possibles lors d'une requête de balance
///
/// CONCEPT RUST : thiserror
/// - #[derive(Error)] génère l'implémentation de std::error::Error
/// - #[error("...")] génère Display avec interpolation
/// - Clone + PartialEq : l'erreur vit dans le cache et traverse les channels
///
/// L'absence de wallet n'est PAS une erreur : c'est l'absence de record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Clé publique malformée (pas du base58, ou pas 32 octets)
    #[error("identifiant de wallet invalide : {0}")]
    InvalidIdentifier(String),

    /// Échec de transport : connexion, timeout, réponse illisible
    #[error("échec réseau : {0}")]
    Network(String),

    /// Le endpoint a répondu mais a refusé la requête
    #[error("requête rejetée par le ledger : {0}")]
    Rejected(String),
}

/// Statut d'un record de balance
///
/// CONCEPT RUST : State machine avec enum
/// - Pending : fetch en cours, afficher un placeholder
/// - Fresh : valeur affichable telle quelle
/// - Error : afficher un placeholder, jamais zéro ni une valeur périmée
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Fresh,
    Error(FetchError),
}

/// Balance cachée d'un wallet
///
/// Propriété exclusive du BalanceCache : aucun autre module ne mute
/// un record, la présentation ne fait que le lire.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    /// Identifiant du wallet auquel cette balance appartient
    pub key: WalletIdentifier,

    /// Montant en lamports (plus petite unité)
    /// Significatif uniquement quand status == Fresh
    pub lamports: u64,

    /// Date du dernier fetch réussi
    pub fetched_at: Option<DateTime<Utc>>,

    /// Statut du record (pending / fresh / error)
    pub status: FetchStatus,
}

impl BalanceRecord {
    /// Crée un record en attente de résolution
    pub fn pending(key: WalletIdentifier) -> Self {
        Self {
            key,
            lamports: 0,
            fetched_at: None,
            status: FetchStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == FetchStatus::Pending
    }

    pub fn is_fresh(&self) -> bool {
        self.status == FetchStatus::Fresh
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, FetchStatus::Error(_))
    }

    /// Retourne le message d'erreur si le record est en erreur
    pub fn error_message(&self) -> Option<String> {
        match &self.status {
            FetchStatus::Error(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Formatte la balance pour l'affichage
    ///
    /// Format : "1.0000 SOL" si fraîche, "…" pendant le fetch,
    /// "—" en erreur (jamais zéro, jamais une valeur périmée)
    pub fn display(&self) -> String {
        match self.status {
            FetchStatus::Fresh => format!("{} SOL", format_sol(self.lamports)),
            FetchStatus::Pending => "…".to_string(),
            FetchStatus::Error(_) => "—".to_string(),
        }
    }
}

/// Convertit des lamports en SOL affichables (4 décimales)
///
/// CONCEPT RUST : f64 pour l'affichage uniquement
/// - Le montant stocké reste un u64 exact en lamports
/// - La division flottante ne sert qu'au formatage
pub fn format_sol(lamports: u64) -> String {
    format!("{:.4}", lamports as f64 / LAMPORTS_PER_SOL as f64)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> WalletIdentifier {
        WalletIdentifier::new("11111111111111111111111111111111").unwrap()
    }

    #[test]
    fn test_pending_record() {
        let record = BalanceRecord::pending(key());
        assert!(record.is_pending());
        assert!(record.fetched_at.is_none());
        assert_eq!(record.display(), "…");
    }

    #[test]
    fn test_format_sol_one_sol() {
        // 1_000_000_000 lamports = 1.0000 SOL (base à 9 décimales)
        assert_eq!(format_sol(LAMPORTS_PER_SOL), "1.0000");
    }

    #[test]
    fn test_format_sol_fraction() {
        assert_eq!(format_sol(123_400_000), "0.1234");
        assert_eq!(format_sol(0), "0.0000");
    }

    #[test]
    fn test_fresh_display() {
        let mut record = BalanceRecord::pending(key());
        record.lamports = 2_500_000_000;
        record.status = FetchStatus::Fresh;
        record.fetched_at = Some(Utc::now());

        assert_eq!(record.display(), "2.5000 SOL");
    }

    #[test]
    fn test_error_display_is_placeholder() {
        let mut record = BalanceRecord::pending(key());
        // Même avec un montant résiduel, une erreur n'affiche jamais de valeur
        record.lamports = 42;
        record.status = FetchStatus::Error(FetchError::Network("timeout".into()));

        assert_eq!(record.display(), "—");
        assert_eq!(record.error_message(), Some("échec réseau : timeout".to_string()));
    }
}
