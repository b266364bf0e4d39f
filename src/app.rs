// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Composition : App possède la session, le cache et les données marché
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - La session et le cache sont couplés par événements explicites :
//   le cache ne refetch que sur changement réel d'identifiant,
//   jamais parce que l'écran se redessine
// ============================================================================

use tracing::{debug, info};

use crate::cache::{BalanceCache, FetchRequest};
use crate::models::{BalanceRecord, FetchError, MarketSnapshot, WalletIdentifier};
use crate::session::{SessionEvent, WalletSession};

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente les différents écrans de l'application
// - Pattern "State Machine" : un seul écran actif à la fois
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue unique : graphique, stats marché et balance du wallet
    Dashboard,

    /// Mode saisie : capture de l'adresse du wallet à connecter
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Capture les touches pour construire un buffer
    /// - Enter valide, ESC annule
    InputMode,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Session wallet (identifiant autorisé courant)
    pub session: WalletSession,

    /// Cache de balance (dédupliqué, un record par identité)
    pub cache: BalanceCache,

    /// Données marché statiques (graphique 7 jours + panneau pulse)
    pub market: MarketSnapshot,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    pub confirm_quit: bool,

    /// Indique si l'utilisateur a demandé la déconnexion (attend confirmation)
    /// Même pattern two-step que le quit
    pub confirm_disconnect: bool,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,

    /// Dernier message d'erreur de saisie (adresse vide, etc.)
    pub input_error: Option<String>,
}

impl App {
    /// Crée une nouvelle instance de App, session déconnectée
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            session: WalletSession::new(),
            cache: BalanceCache::new(),
            market: MarketSnapshot::sample(),
            confirm_quit: false,
            confirm_disconnect: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
            input_error: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// CONCEPT : Event Loop Pattern
    /// - tick() est appelé régulièrement (chaque frame)
    /// - Le rendu lit le cache sans jamais déclencher de fetch,
    ///   il n'y a donc rien à resynchroniser ici
    pub fn tick(&mut self) {}

    // ========================================================================
    // Session wallet et balance
    // ========================================================================

    /// Connecte un wallet (ou switch de compte si déjà connecté)
    ///
    /// CONCEPT : Couplage par événement
    /// - La session émet un SessionEvent
    /// - L'événement est transmis au cache immédiatement : l'ancienne
    ///   identité est invalidée et un fetch est mis en file
    pub fn connect_wallet(&mut self, id: WalletIdentifier) {
        let event = self.session.connect(id);
        self.on_session_event(event);
    }

    /// Déconnecte le wallet courant
    pub fn disconnect_wallet(&mut self) {
        let event = self.session.disconnect();
        self.on_session_event(event);
        self.confirm_disconnect = false;
    }

    /// Réagit à un changement de session en resynchronisant le cache
    fn on_session_event(&mut self, event: SessionEvent) {
        debug!(?event, "Session event");
        match event {
            SessionEvent::Connected(_) | SessionEvent::Disconnected => {
                self.cache.get_balance(self.session.current());
            }
        }
    }

    /// Refresh manuel de la balance
    ///
    /// Seule voie de récupération après une erreur : invalide puis
    /// reconsulte (no-op si un fetch est déjà en vol ou sans wallet)
    pub fn refresh_balance(&mut self) {
        info!("Manual balance refresh requested");
        self.cache.invalidate();
        self.cache.get_balance(self.session.current());
    }

    /// Transmet la requête de fetch en attente, s'il y en a une
    pub fn take_fetch_request(&mut self) -> Option<FetchRequest> {
        self.cache.take_fetch_request()
    }

    /// Applique un résultat de fetch reçu du worker
    pub fn apply_fetch_result(
        &mut self,
        seq: u64,
        key: &WalletIdentifier,
        result: Result<u64, FetchError>,
    ) {
        match result {
            Ok(lamports) => self.cache.apply_success(seq, key, lamports),
            Err(error) => self.cache.apply_failure(seq, key, error),
        }
    }

    /// Record de balance courant, pour le rendu (lecture seule)
    pub fn balance_record(&self) -> Option<&BalanceRecord> {
        self.cache.current()
    }

    // ========================================================================
    // Navigation d'écrans
    // ========================================================================

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Première pression de 'q' : active confirm_quit
    /// - Deuxième pression : quit réel
    /// - N'importe quelle autre touche : annulation
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Disconnect Confirmation Management
    // ========================================================================

    /// Demande la confirmation de déconnexion
    pub fn request_disconnect(&mut self) {
        self.confirm_disconnect = true;
    }

    pub fn cancel_disconnect(&mut self) {
        self.confirm_disconnect = false;
    }

    pub fn is_awaiting_disconnect_confirmation(&self) -> bool {
        self.confirm_disconnect
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode input avec un prompt donné
    ///
    /// CONCEPT : Modal input (Vim-like)
    /// - Change l'écran vers InputMode
    /// - Initialise le buffer vide
    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
        self.input_error = None;
    }

    /// Annule le mode input et retourne au dashboard
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
        self.input_error = None;
    }

    /// Récupère la valeur saisie et retourne au dashboard
    ///
    /// CONCEPT : Consume input
    /// - Retourne le contenu du buffer
    /// - Vide le buffer et retourne au dashboard
    pub fn submit_input(&mut self) -> String {
        let value = self.input_buffer.clone();
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
        self.input_error = None;
        value
    }

    /// Ajoute un caractère au buffer d'input
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    /// Supprime le dernier caractère du buffer
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }
}

// ============================================================================
// Trait Default
// ============================================================================
// Convention Rust : si new() ne prend pas de paramètres, implémenter Default
// ============================================================================

impl Default for App {
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
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(!app.session.is_connected());
        assert!(app.balance_record().is_none());
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        assert!(app.is_running());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_connect_schedules_fetch() {
        let mut app = App::new();
        app.connect_wallet(wallet("ABC"));

        // La connexion installe un record pending et met un fetch en file
        assert!(app.balance_record().unwrap().is_pending());
        let request = app.take_fetch_request().unwrap();
        assert_eq!(request.key, wallet("ABC"));
        assert!(app.take_fetch_request().is_none());
    }

    #[test]
    fn test_disconnect_clears_balance() {
        let mut app = App::new();
        app.connect_wallet(wallet("ABC"));
        let req = app.take_fetch_request().unwrap();
        app.apply_fetch_result(req.seq, &req.key, Ok(42));
        assert!(app.balance_record().unwrap().is_fresh());

        app.disconnect_wallet();
        assert!(app.balance_record().is_none());
    }

    #[test]
    fn test_account_switch_refetches() {
        let mut app = App::new();
        app.connect_wallet(wallet("first"));
        let req1 = app.take_fetch_request().unwrap();
        app.apply_fetch_result(req1.seq, &req1.key, Ok(100));

        // Switch de compte : nouveau record pending pour la nouvelle clé
        app.connect_wallet(wallet("second"));
        let record = app.balance_record().unwrap();
        assert_eq!(record.key, wallet("second"));
        assert!(record.is_pending());

        let req2 = app.take_fetch_request().unwrap();
        assert_eq!(req2.key, wallet("second"));
    }

    #[test]
    fn test_refresh_after_error() {
        let mut app = App::new();
        app.connect_wallet(wallet("XYZ"));
        let req = app.take_fetch_request().unwrap();
        app.apply_fetch_result(
            req.seq,
            &req.key,
            Err(FetchError::Network("down".into())),
        );
        assert!(app.balance_record().unwrap().is_error());

        // Le refresh manuel relance un fetch
        app.refresh_balance();
        assert!(app.balance_record().unwrap().is_pending());
        assert!(app.take_fetch_request().is_some());
    }

    #[test]
    fn test_input_mode_flow() {
        let mut app = App::new();
        app.start_input("Wallet address: ".to_string());
        assert!(app.is_in_input_mode());

        app.append_char('A');
        app.append_char('B');
        app.append_char('C');
        app.backspace();
        assert_eq!(app.input_buffer, "AB");

        let value = app.submit_input();
        assert_eq!(value, "AB");
        assert!(app.is_on_dashboard());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_input_cancel() {
        let mut app = App::new();
        app.start_input("Wallet address: ".to_string());
        app.append_char('X');

        app.cancel_input();
        assert!(app.is_on_dashboard());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_quit_confirmation_two_step() {
        let mut app = App::new();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
    }

    #[test]
    fn test_disconnect_confirmation_two_step() {
        let mut app = App::new();
        app.connect_wallet(wallet("ABC"));

        app.request_disconnect();
        assert!(app.is_awaiting_disconnect_confirmation());

        app.disconnect_wallet();
        assert!(!app.is_awaiting_disconnect_confirmation());
        assert!(!app.session.is_connected());
    }
}
