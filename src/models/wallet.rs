// ============================================================================
// Structure : WalletIdentifier
// ============================================================================
// Représente l'identifiant public d'un wallet (clé publique base58)
//
// CONCEPTS RUST :
// 1. Newtype pattern : wrapper autour de String pour un type dédié
// 2. Hash + Eq : permet d'utiliser l'identifiant comme clé de cache
// 3. Display : formatage pour l'affichage et les logs
// ============================================================================

use std::fmt;

use crate::models::balance::FetchError;

/// Taille attendue d'une clé publique décodée (ed25519)
pub const PUBKEY_BYTES: usize = 32;

/// Identifiant public d'un wallet
///
/// CONCEPT RUST : Newtype pattern
/// - Un type distinct de String : impossible de confondre une adresse
///   avec un autre texte dans les signatures de fonctions
/// - La valeur reste opaque : la validation base58 se fait au moment
///   de la requête ledger, pas à la construction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletIdentifier(String);

impl WalletIdentifier {
    /// Crée un identifiant depuis une saisie utilisateur
    ///
    /// CONCEPT RUST : Option comme résultat de construction
    /// - Some(id) : saisie non vide (après trim)
    /// - None : saisie vide, pas de wallet à connecter
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let trimmed = raw.into().trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed))
        }
    }

    /// Retourne l'adresse complète
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Vérifie que l'identifiant est une clé publique base58 valide
    ///
    /// CONCEPT RUST : Result pour la validation
    /// - Ok(()) : la clé décode bien vers 32 octets
    /// - Err(InvalidIdentifier) : base58 invalide ou mauvaise longueur
    ///
    /// Appelé par le client ledger AVANT tout appel réseau : une clé
    /// malformée est rejetée au lieu d'être silencieusement traitée
    /// comme une balance à zéro.
    pub fn validate(&self) -> Result<(), FetchError> {
        let decoded = bs58::decode(&self.0)
            .into_vec()
            .map_err(|_| FetchError::InvalidIdentifier(self.0.clone()))?;

        if decoded.len() != PUBKEY_BYTES {
            return Err(FetchError::InvalidIdentifier(self.0.clone()));
        }

        Ok(())
    }

    /// Forme raccourcie pour le header (ex: "4Nd1…DB4T")
    ///
    /// CONCEPT RUST : chars() vs bytes
    /// - On découpe sur les caractères, pas les octets
    /// - Base58 est ASCII mais autant rester correct
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }

        let head: String = chars.iter().take(4).collect();
        let tail: String = chars.iter().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{}…{}", head, tail)
    }
}

impl fmt::Display for WalletIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Clé publique valide : le system program Solana (32 octets de zéros)
    const VALID_KEY: &str = "11111111111111111111111111111111";

    #[test]
    fn test_new_trims_input() {
        let id = WalletIdentifier::new("  ABC  ").unwrap();
        assert_eq!(id.as_str(), "ABC");
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(WalletIdentifier::new("").is_none());
        assert!(WalletIdentifier::new("   ").is_none());
    }

    #[test]
    fn test_validate_accepts_32_byte_key() {
        let id = WalletIdentifier::new(VALID_KEY).unwrap();
        assert!(id.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_charset() {
        // '0', 'O', 'I' et 'l' ne font pas partie de l'alphabet base58
        let id = WalletIdentifier::new("0OIl-not-base58").unwrap();
        assert!(matches!(
            id.validate(),
            Err(FetchError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        // Décode correctement mais vers moins de 32 octets
        let id = WalletIdentifier::new("abc").unwrap();
        assert!(matches!(
            id.validate(),
            Err(FetchError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_short_form() {
        let id = WalletIdentifier::new("4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T").unwrap();
        assert_eq!(id.short(), "4Nd1…DB4T");

        // Une adresse courte reste entière
        let id = WalletIdentifier::new("ABC").unwrap();
        assert_eq!(id.short(), "ABC");
    }
}
