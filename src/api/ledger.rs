// ============================================================================
// API Client : Ledger JSON-RPC
// ============================================================================
// Interroge le endpoint JSON-RPC du ledger pour récupérer les balances
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. async_trait : trait BalanceSource avec méthode async (mockable en test)
// 3. Serde : sérialisation du payload JSON-RPC et parsing de la réponse
// 4. Mapping d'erreurs : transport → Network, refus du endpoint → Rejected
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::models::{FetchError, WalletIdentifier};

/// Endpoint utilisé quand NEXADASH_RPC_URL n'est pas défini
const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Timeout du client HTTP : le deadline appartient au collaborateur
/// réseau, le cache lui-même n'en impose aucun
const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Trait : BalanceSource
// ============================================================================
// CONCEPT RUST : Trait objects + async_trait
// - Le worker dépend de `Arc<dyn BalanceSource>`, pas du client concret
// - Les tests fournissent un mock déterministe à la place du réseau
// ============================================================================

/// Source de balances : le ledger réel, ou un mock en test
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Retourne la balance en plus petite unité (lamports)
    ///
    /// Appelé au plus une fois par cache miss ; l'appel peut échouer
    /// (réseau, rejet du endpoint, clé malformée)
    async fn query_balance(&self, key: &WalletIdentifier) -> Result<u64, FetchError>;
}

// ============================================================================
// Structures pour parser la réponse JSON-RPC
// ============================================================================
// Le ledger répond au format JSON-RPC 2.0 :
//   {"jsonrpc":"2.0","result":{"context":{...},"value":1000000000},"id":1}
// ou en cas d'erreur :
//   {"jsonrpc":"2.0","error":{"code":-32602,"message":"..."},"id":1}
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    /// Balance en lamports
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

// ============================================================================
// Structure : LedgerConnection
// ============================================================================

/// Connexion longue durée vers le endpoint du ledger
///
/// CONCEPT RUST : Client réutilisable
/// - reqwest::Client maintient un pool de connexions
/// - Construit une seule fois au démarrage, partagé via Arc
pub struct LedgerConnection {
    client: reqwest::Client,
    endpoint: String,
}

impl LedgerConnection {
    /// Crée une connexion vers un endpoint donné
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Échec de la création du client HTTP")?;

        let endpoint = endpoint.into();
        info!(endpoint = %endpoint, "Ledger connection ready");

        Ok(Self { client, endpoint })
    }

    /// Crée une connexion depuis l'environnement
    ///
    /// NEXADASH_RPC_URL permet de pointer vers un autre endpoint
    /// (devnet, noeud local, etc.)
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint =
            std::env::var("NEXADASH_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        Self::new(endpoint)
    }

    /// Construit le payload JSON-RPC getBalance
    fn build_payload(key: &WalletIdentifier) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [key.as_str()]
        })
    }
}

#[async_trait]
impl BalanceSource for LedgerConnection {
    /// Interroge la balance d'un wallet
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Macro tracing qui ajoute automatiquement un span
    /// - Tous les logs à l'intérieur auront le contexte du wallet
    #[instrument(skip(self, key), fields(wallet = %key.short()))]
    async fn query_balance(&self, key: &WalletIdentifier) -> Result<u64, FetchError> {
        // Validation AVANT tout appel réseau : une clé malformée est
        // rejetée au lieu de produire une balance fantôme
        key.validate()?;

        let payload = Self::build_payload(key);
        debug!(endpoint = %self.endpoint, "Sending getBalance request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Received ledger response");

        if !status.is_success() {
            error!(status = %status, "Ledger returned error status");
            return Err(FetchError::Rejected(format!("HTTP {}", status)));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(format!("réponse illisible : {}", e)))?;

        // Un objet error JSON-RPC est un refus du endpoint, pas une
        // erreur de transport
        if let Some(err) = body.error {
            error!(code = err.code, message = %err.message, "Ledger rejected the request");
            return Err(FetchError::Rejected(err.message));
        }

        let lamports = body
            .result
            .map(|r| r.value)
            .ok_or_else(|| FetchError::Rejected("réponse sans résultat".to_string()))?;

        info!(lamports, "Balance fetched from ledger");
        Ok(lamports)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_KEY: &str = "11111111111111111111111111111111";

    fn wallet(s: &str) -> WalletIdentifier {
        WalletIdentifier::new(s).unwrap()
    }

    #[test]
    fn test_build_payload() {
        let payload = LedgerConnection::build_payload(&wallet(VALID_KEY));

        assert_eq!(payload["method"], "getBalance");
        assert_eq!(payload["jsonrpc"], "2.0");
        assert_eq!(payload["params"][0], VALID_KEY);
    }

    #[test]
    fn test_parse_success_response() {
        let raw = r#"{"jsonrpc":"2.0","result":{"context":{"slot":12345},"value":1000000000},"id":1}"#;
        let body: RpcResponse = serde_json::from_str(raw).unwrap();

        assert!(body.error.is_none());
        assert_eq!(body.result.unwrap().value, 1_000_000_000);
    }

    #[test]
    fn test_parse_error_response() {
        let raw = r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":1}"#;
        let body: RpcResponse = serde_json::from_str(raw).unwrap();

        assert!(body.result.is_none());
        let err = body.error.unwrap();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Invalid param");
    }

    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_invalid_identifier_fails_without_network() {
        // Endpoint volontairement injoignable : la validation doit
        // rejeter la clé avant même de tenter l'appel
        let ledger = LedgerConnection::new("http://127.0.0.1:1").unwrap();
        let result = ledger.query_balance(&wallet("not-a-valid-key!")).await;

        assert!(matches!(result, Err(FetchError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let ledger = LedgerConnection::new("http://127.0.0.1:1").unwrap();
        let result = ledger.query_balance(&wallet(VALID_KEY)).await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    // ========================================================================
    // Mock : source de balance déterministe pour les tests du flux complet
    // ========================================================================

    struct MockLedger {
        lamports: u64,
    }

    #[async_trait]
    impl BalanceSource for MockLedger {
        async fn query_balance(&self, key: &WalletIdentifier) -> Result<u64, FetchError> {
            key.validate().ok(); // le mock accepte toute clé
            Ok(self.lamports)
        }
    }

    #[tokio::test]
    async fn test_mock_source_resolves_cache_to_fresh() {
        use crate::cache::BalanceCache;

        // Un ledger mocké qui retourne 1_000_000_000 lamports : la
        // consultation doit finir sur un record frais à 1.0000
        let source = MockLedger {
            lamports: 1_000_000_000,
        };
        let mut cache = BalanceCache::new();
        let id = wallet("ABC");

        cache.get_balance(Some(&id));
        let req = cache.take_fetch_request().unwrap();

        let result = source.query_balance(&req.key).await.unwrap();
        cache.apply_success(req.seq, &req.key, result);

        let record = cache.current().unwrap();
        assert!(record.is_fresh());
        assert_eq!(record.display(), "1.0000 SOL");
    }
}
