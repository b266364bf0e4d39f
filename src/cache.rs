// ============================================================================
// Structure : BalanceCache
// ============================================================================
// Cache dédupliquant des requêtes de balance, indexé par identifiant de wallet
//
// CONCEPTS RUST :
// 1. State machine : none → pending → {fresh, error}
// 2. Ownership exclusif : seul le cache mute ses BalanceRecord
// 3. Numéro de séquence : écarter les résultats de fetch périmés
//
// Invariants :
// - Au plus un record à la fois (celui de l'identité courante)
// - Au plus un fetch en vol par identifiant (coalescing via le statut Pending)
// - Un résultat périmé (séquence ou clé différente) est écarté à l'arrivée :
//   la balance d'une ancienne identité ne s'affiche jamais sous la nouvelle
// ============================================================================

use tracing::{debug, info, warn};

use crate::models::{BalanceRecord, FetchError, FetchStatus, WalletIdentifier};

/// Requête de fetch à exécuter par l'orchestrateur
///
/// CONCEPT : Command pattern
/// - Le cache ne fait pas de réseau lui-même : il émet une requête
/// - L'orchestrateur (main) la transmet au worker thread
/// - seq : numéro de séquence que le résultat devra présenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: WalletIdentifier,
    pub seq: u64,
}

/// Cache de balance à un seul slot (l'identité courante)
///
/// CONCEPT : Single-threaded cooperative
/// - Muté uniquement depuis la boucle d'événements (derrière le Mutex de App)
/// - Les transitions sont atomiques du point de vue de la boucle
pub struct BalanceCache {
    /// Record courant, ou None si aucun wallet / après invalidation
    entry: Option<BalanceRecord>,

    /// Numéro de séquence du dernier fetch lancé
    /// Incrémenté à chaque nouveau record Pending : un résultat qui
    /// arrive avec un numéro plus ancien est écarté
    fetch_seq: u64,

    /// Requête en attente de dispatch (consommée par take_fetch_request)
    pending_fetch: Option<FetchRequest>,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self {
            entry: None,
            fetch_seq: 0,
            pending_fetch: None,
        }
    }

    /// Consulte la balance pour l'identifiant courant
    ///
    /// Sémantique :
    /// - None : pas de wallet → détruit le record, retourne None, aucun fetch
    /// - Some(id), record présent pour ce même id : cache hit, retourne le
    ///   record tel quel (Pending comme Error : pas de nouveau fetch)
    /// - Some(id), pas de record ou record d'une autre clé : installe un
    ///   record Pending et met en file EXACTEMENT une requête de fetch
    ///
    /// CONCEPT RUST : &mut self + retour de référence
    /// - Le borrow checker garantit qu'aucun autre lecteur ne voit
    ///   l'état intermédiaire
    pub fn get_balance(&mut self, current: Option<&WalletIdentifier>) -> Option<&BalanceRecord> {
        let Some(id) = current else {
            // Fin de session : le record est détruit, pas de placeholder périmé
            if self.entry.is_some() {
                debug!("Wallet disconnected, dropping balance record");
                self.entry = None;
            }
            return None;
        };

        // Cache hit : même clé, quel que soit le statut
        // Un record Error reste un hit : pas de retry automatique,
        // la récupération passe par invalidate()
        let hit = self
            .entry
            .as_ref()
            .map(|e| e.key == *id)
            .unwrap_or(false);

        if !hit {
            // Miss ou changement d'identité : nouveau record Pending
            // L'ancien record (autre clé) est détruit ici même
            self.fetch_seq += 1;
            info!(wallet = %id.short(), seq = self.fetch_seq, "Balance cache miss, scheduling fetch");
            self.entry = Some(BalanceRecord::pending(id.clone()));
            self.pending_fetch = Some(FetchRequest {
                key: id.clone(),
                seq: self.fetch_seq,
            });
        }

        self.entry.as_ref()
    }

    /// Lecture seule du record courant (pour le rendu)
    ///
    /// Ne déclenche jamais de fetch : le rendu n'a pas d'effet de bord,
    /// le refetch ne se produit que sur changement réel d'identifiant
    pub fn current(&self) -> Option<&BalanceRecord> {
        self.entry.as_ref()
    }

    /// Consomme la requête de fetch en attente, s'il y en a une
    ///
    /// CONCEPT RUST : Option::take
    /// - Remplace le champ par None et retourne l'ancienne valeur
    /// - Garantit qu'une requête n'est dispatchée qu'une seule fois
    pub fn take_fetch_request(&mut self) -> Option<FetchRequest> {
        self.pending_fetch.take()
    }

    /// Invalide le record courant (refresh manuel)
    ///
    /// No-op si un fetch est déjà en vol : invalider un Pending lancerait
    /// un second appel concurrent pour la même clé
    pub fn invalidate(&mut self) {
        match &self.entry {
            Some(entry) if entry.is_pending() => {
                debug!(wallet = %entry.key.short(), "Refresh ignored, fetch already in flight");
            }
            Some(entry) => {
                info!(wallet = %entry.key.short(), "Balance record invalidated");
                self.entry = None;
            }
            None => {}
        }
    }

    /// Applique un résultat de fetch réussi
    ///
    /// Le résultat n'est accepté que s'il correspond au fetch courant
    /// (même séquence, même clé, record encore Pending) : un résultat
    /// arrivé après un changement d'identité est écarté
    pub fn apply_success(&mut self, seq: u64, key: &WalletIdentifier, lamports: u64) {
        if !self.accepts(seq, key) {
            warn!(wallet = %key.short(), seq, current_seq = self.fetch_seq, "Discarding stale fetch result");
            return;
        }

        if let Some(entry) = &mut self.entry {
            entry.lamports = lamports;
            entry.fetched_at = Some(chrono::Utc::now());
            entry.status = FetchStatus::Fresh;
            info!(wallet = %key.short(), lamports, "Balance updated");
        }
    }

    /// Applique un résultat de fetch en échec
    ///
    /// Même garde anti-périmé que apply_success ; l'erreur est stockée
    /// dans le statut du record et affichée comme placeholder
    pub fn apply_failure(&mut self, seq: u64, key: &WalletIdentifier, error: FetchError) {
        if !self.accepts(seq, key) {
            warn!(wallet = %key.short(), seq, current_seq = self.fetch_seq, "Discarding stale fetch error");
            return;
        }

        if let Some(entry) = &mut self.entry {
            info!(wallet = %key.short(), error = %error, "Balance fetch failed");
            entry.status = FetchStatus::Error(error);
        }
    }

    /// Garde commune : le résultat correspond-il au fetch courant ?
    fn accepts(&self, seq: u64, key: &WalletIdentifier) -> bool {
        if seq != self.fetch_seq {
            return false;
        }

        match &self.entry {
            Some(entry) => entry.key == *key && entry.is_pending(),
            None => false,
        }
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Chaque test couvre une propriété du cache : coalescing, absence de fetch
// sans wallet, écart des résultats périmés, idempotence des hits, retry
// après invalidation
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(s: &str) -> WalletIdentifier {
        WalletIdentifier::new(s).unwrap()
    }

    #[test]
    fn test_no_wallet_no_fetch() {
        let mut cache = BalanceCache::new();

        assert!(cache.get_balance(None).is_none());
        assert!(cache.take_fetch_request().is_none());
    }

    #[test]
    fn test_miss_creates_pending_and_one_request() {
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        let record = cache.get_balance(Some(&id)).unwrap();
        assert!(record.is_pending());
        assert_eq!(record.key, id);

        let request = cache.take_fetch_request().unwrap();
        assert_eq!(request.key, id);
    }

    #[test]
    fn test_request_coalescing() {
        // Deux consultations avant résolution : une seule requête réseau
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        cache.get_balance(Some(&id));

        assert!(cache.take_fetch_request().is_some());
        assert!(cache.take_fetch_request().is_none());
    }

    #[test]
    fn test_success_makes_fresh() {
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();
        cache.apply_success(req.seq, &req.key, 1_000_000_000);

        let record = cache.current().unwrap();
        assert!(record.is_fresh());
        assert_eq!(record.lamports, 1_000_000_000);
        assert!(record.fetched_at.is_some());
        // 1_000_000_000 lamports = 1.0000 en unités majeures
        assert_eq!(record.display(), "1.0000 SOL");
    }

    #[test]
    fn test_fresh_hit_is_idempotent() {
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();
        cache.apply_success(req.seq, &req.key, 500);

        // Consultations répétées : même record, aucune nouvelle requête
        let first = cache.get_balance(Some(&id)).unwrap().clone();
        let second = cache.get_balance(Some(&id)).unwrap().clone();
        assert_eq!(first, second);
        assert!(cache.take_fetch_request().is_none());
    }

    #[test]
    fn test_identity_switch_discards_stale_result() {
        // La course critique : i1 en vol, l'utilisateur passe à i2.
        // Le résultat de i1 arrive après coup et doit être écarté.
        let mut cache = BalanceCache::new();
        let i1 = wallet("wallet-one");
        let i2 = wallet("wallet-two");

        cache.get_balance(Some(&i1));
        let req1 = cache.take_fetch_request().unwrap();

        // Changement d'identité pendant que le fetch de i1 est en vol
        cache.get_balance(Some(&i2));
        let req2 = cache.take_fetch_request().unwrap();
        assert_eq!(req2.key, i2);

        // Le résultat périmé de i1 arrive : il ne doit PAS écraser i2
        cache.apply_success(req1.seq, &req1.key, 999_999);
        let record = cache.current().unwrap();
        assert_eq!(record.key, i2);
        assert!(record.is_pending());

        // Le résultat de i2 est lui accepté
        cache.apply_success(req2.seq, &req2.key, 777);
        let record = cache.current().unwrap();
        assert_eq!(record.key, i2);
        assert!(record.is_fresh());
        assert_eq!(record.lamports, 777);
    }

    #[test]
    fn test_stale_seq_same_key_discarded() {
        // Même clé mais séquence périmée (refresh pendant reconnexion)
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let old_req = cache.take_fetch_request().unwrap();

        // Déconnexion puis reconnexion du même wallet : nouveau fetch
        cache.get_balance(None);
        cache.get_balance(Some(&id));
        let new_req = cache.take_fetch_request().unwrap();
        assert!(new_req.seq > old_req.seq);

        // L'ancien résultat ne doit pas résoudre le nouveau record
        cache.apply_success(old_req.seq, &old_req.key, 111);
        assert!(cache.current().unwrap().is_pending());

        cache.apply_success(new_req.seq, &new_req.key, 222);
        assert_eq!(cache.current().unwrap().lamports, 222);
    }

    #[test]
    fn test_error_then_retry_after_invalidation() {
        let mut cache = BalanceCache::new();
        let id = wallet("XYZ");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();
        cache.apply_failure(req.seq, &req.key, FetchError::Network("timeout".into()));

        // Le record est en erreur, affiché comme placeholder
        let record = cache.get_balance(Some(&id)).unwrap();
        assert!(record.is_error());
        assert_eq!(record.display(), "—");

        // Pas de retry automatique : consultation = hit, pas de requête
        assert!(cache.take_fetch_request().is_none());

        // Après invalidation, la consultation relance un fetch
        cache.invalidate();
        let record = cache.get_balance(Some(&id)).unwrap();
        assert!(record.is_pending());
        assert!(cache.take_fetch_request().is_some());
    }

    #[test]
    fn test_invalidate_while_pending_is_noop() {
        // Invalider pendant un fetch en vol ne doit pas lancer un second appel
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();

        cache.invalidate();
        cache.get_balance(Some(&id));
        assert!(cache.take_fetch_request().is_none());

        // Le fetch en vol reste valide et résout le record
        cache.apply_success(req.seq, &req.key, 42);
        assert!(cache.current().unwrap().is_fresh());
    }

    #[test]
    fn test_disconnect_destroys_record() {
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();
        cache.apply_success(req.seq, &req.key, 123);

        // Déconnexion : le record est détruit
        assert!(cache.get_balance(None).is_none());
        assert!(cache.current().is_none());

        // Reconnexion du même wallet : refetch, pas de valeur périmée
        let record = cache.get_balance(Some(&id)).unwrap();
        assert!(record.is_pending());
        assert!(cache.take_fetch_request().is_some());
    }

    #[test]
    fn test_late_result_after_disconnect_discarded() {
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();

        // Déconnexion pendant le fetch : le résultat tardif est écarté
        cache.get_balance(None);
        cache.apply_success(req.seq, &req.key, 555);
        assert!(cache.current().is_none());
    }
}
