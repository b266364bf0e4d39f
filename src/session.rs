// ============================================================================
// Structure : WalletSession
// ============================================================================
// Détient l'identifiant du wallet actuellement autorisé (ou aucun)
//
// CONCEPTS RUST :
// 1. Option<WalletIdentifier> : l'état "non connecté" est un état valide
// 2. Événements de changement : chaque transition retourne un SessionEvent
//    que la couche app transmet au cache (abonnement explicite, le refetch
//    ne dépend jamais du rendu)
// ============================================================================

use tracing::info;

use crate::models::WalletIdentifier;

/// Notification de changement de session
///
/// CONCEPT : Event enum
/// - Émis par connect()/disconnect(), consommé par App
/// - Un switch de compte est un Connected avec une nouvelle clé
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Un wallet vient d'être autorisé (connexion ou switch de compte)
    Connected(WalletIdentifier),

    /// Le wallet a été déconnecté
    Disconnected,
}

/// Session wallet courante
pub struct WalletSession {
    /// Identifiant autorisé, None si non connecté
    current: Option<WalletIdentifier>,
}

impl WalletSession {
    /// Crée une session non connectée
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Retourne l'identifiant courant
    pub fn current(&self) -> Option<&WalletIdentifier> {
        self.current.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// Autorise un wallet (remplace l'éventuel wallet précédent)
    ///
    /// CONCEPT : Switch de compte
    /// - Connecter par-dessus une session existante est un switch :
    ///   l'événement émis force le cache à invalider l'ancienne identité
    pub fn connect(&mut self, id: WalletIdentifier) -> SessionEvent {
        match &self.current {
            Some(previous) => {
                info!(from = %previous.short(), to = %id.short(), "Switching wallet")
            }
            None => info!(wallet = %id.short(), "Wallet connected"),
        }

        self.current = Some(id.clone());
        SessionEvent::Connected(id)
    }

    /// Déconnecte le wallet courant
    pub fn disconnect(&mut self) -> SessionEvent {
        if let Some(id) = &self.current {
            info!(wallet = %id.short(), "Wallet disconnected");
        }

        self.current = None;
        SessionEvent::Disconnected
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(s: &str) -> WalletIdentifier {
        WalletIdentifier::new(s).unwrap()
    }

    #[test]
    fn test_starts_disconnected() {
        let session = WalletSession::new();
        assert!(!session.is_connected());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_connect_emits_event() {
        let mut session = WalletSession::new();
        let id = wallet("ABC");

        let event = session.connect(id.clone());
        assert_eq!(event, SessionEvent::Connected(id.clone()));
        assert_eq!(session.current(), Some(&id));
    }

    #[test]
    fn test_connect_replaces_previous() {
        // Un switch de compte est une simple reconnexion
        let mut session = WalletSession::new();
        session.connect(wallet("first"));

        let id2 = wallet("second");
        let event = session.connect(id2.clone());
        assert_eq!(event, SessionEvent::Connected(id2.clone()));
        assert_eq!(session.current(), Some(&id2));
    }

    #[test]
    fn test_disconnect() {
        let mut session = WalletSession::new();
        session.connect(wallet("ABC"));

        let event = session.disconnect();
        assert_eq!(event, SessionEvent::Disconnected);
        assert!(!session.is_connected());
    }
}
