// ============================================================================
// NexaDash - Dashboard wallet dans le terminal
// ============================================================================
// Programme TUI : graphique de prix, stats marché et balance du wallet
// connecté, récupérée en arrière-plan depuis le ledger
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour les appels ledger
// 4. RAII : restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use nexadash::api::{BalanceSource, LedgerConnection};
use nexadash::app::App;
use nexadash::models::{FetchError, WalletIdentifier};
use nexadash::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : Communication avec le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (requêtes ledger)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer la balance d'un wallet auprès du ledger
    /// - key : identifiant du wallet
    /// - seq : numéro de séquence du fetch (garde anti-périmé du cache)
    FetchBalance { key: WalletIdentifier, seq: u64 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Résultat d'une requête de balance (succès ou échec)
    BalanceFetched {
        key: WalletIdentifier,
        seq: u64,
        result: Result<u64, FetchError>,
    },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/nexadash/logs/nexadash.log
/// - macOS : ~/Library/Application Support/nexadash/logs/nexadash.log
/// - Windows : C:\Users\<user>\AppData\Local\nexadash\logs\nexadash.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/nexadash/logs/nexadash.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=nexadash=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Répertoire de données de la plateforme, sinon ./logs
    let log_dir = dirs::data_local_dir()
        .map(|d| d.join("nexadash").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Rotation quotidienne : nexadash.log.2026-08-07, etc.
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "nexadash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: nexadash::api::ledger)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true),
        )
        .with(
            // Filtre les logs par niveau
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour nexadash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexadash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("NexaDash starting up");

    // Connexion longue durée vers le ledger
    // CONCEPT : Contexte explicite, pas de singleton
    // - La connexion est construite ici, partagée via Arc avec le worker,
    //   et détruite à la fin du process
    let ledger: Arc<dyn BalanceSource> =
        Arc::new(LedgerConnection::from_env().context("Échec de la connexion au ledger")?);

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // État de l'application, session déconnectée au départ
    // CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
    // - Arc : Reference counting pour ownership partagé
    // - Mutex : Protection contre les data races
    let app = Arc::new(Mutex::new(App::new()));

    // Channels de communication avec le worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, ledger);

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les requêtes ledger
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - Les appels réseau ne bloquent jamais le rendu
// ============================================================================

/// Worker thread qui exécute les requêtes ledger en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - block_on() bloque le thread worker, pas l'UI
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    ledger: Arc<dyn BalanceSource>,
) {
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        loop {
            match command_rx.recv() {
                Ok(AppCommand::FetchBalance { key, seq }) => {
                    info!(wallet = %key.short(), seq, "Worker received fetch command");

                    let result = runtime.block_on(ledger.query_balance(&key));

                    match &result {
                        Ok(lamports) => {
                            info!(wallet = %key.short(), lamports, "Balance fetched")
                        }
                        Err(e) => error!(wallet = %key.short(), error = %e, "Balance fetch failed"),
                    }

                    let _ = result_tx.send(AppResult::BalanceFetched { key, seq, result });
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - À chaque itération :
//   0. Résultats du worker → cache
//   1. Render
//   2. Input
//   3. Dispatch des fetchs mis en file par le cache
//   4. Update (tick)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        // CONCEPT : Lock scope minimisé
        // - Lock seulement pour lire is_running
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - try_recv() ne bloque pas (contrairement à recv())
        match result_rx.try_recv() {
            Ok(AppResult::BalanceFetched { key, seq, result }) => {
                // Le cache écarte lui-même les résultats périmés
                // (changement d'identité pendant le fetch)
                let mut app_lock = app.lock().unwrap();
                app_lock.apply_fetch_result(seq, &key, result);
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                let mut app_lock = app.lock().unwrap();
                handle_event(&mut app_lock, event);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }

        // ========================================
        // 3. DISPATCH : Envoie les fetchs au worker
        // ========================================
        // Le cache garantit au plus une requête en file par changement
        // d'identité : la dispatcher ici ne peut pas dupliquer d'appel
        {
            let mut app_lock = app.lock().unwrap();
            if let Some(request) = app_lock.take_fetch_request() {
                debug!(wallet = %request.key.short(), seq = request.seq, "Dispatching fetch to worker");
                let _ = command_tx.send(AppCommand::FetchBalance {
                    key: request.key,
                    seq: request.seq,
                });
            }
        }

        // ========================================
        // 4. UPDATE : Met à jour l'état
        // ========================================
        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick();
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Modifie l'état de app selon l'événement
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Les branches du mode input passent en premier : les touches 'q',
///   'c', 'd', 'r' doivent rester saisissables dans une adresse
fn handle_event(app: &mut App, event: nexadash::ui::events::Event) {
    use nexadash::ui::events::{
        get_char_from_event, is_address_char_event, is_backspace_event, is_connect_event,
        is_disconnect_event, is_enter_event, is_escape_event, is_quit_event, is_refresh_event,
        Event,
    };

    match event {
        // ========================================
        // Input Mode : Gestion de la saisie
        // ========================================

        // ESC : annuler le mode input
        Event::Key(_) if is_escape_event(&event) && app.is_in_input_mode() => {
            info!("User cancelled wallet input");
            app.cancel_input();
        }

        // Enter : valider la saisie et connecter le wallet
        Event::Key(_) if is_enter_event(&event) && app.is_in_input_mode() => {
            // Une adresse vide n'est pas une connexion : on reste en saisie
            if app.input_buffer.trim().is_empty() {
                debug!("Empty wallet address, staying in input mode");
                app.input_error = Some("Address cannot be empty".to_string());
                return;
            }

            let raw = app.submit_input();
            match WalletIdentifier::new(raw) {
                Some(id) => {
                    info!(wallet = %id.short(), "User submitted wallet address");
                    // La validité de la clé est vérifiée par le ledger :
                    // une clé malformée finira en record d'erreur
                    app.connect_wallet(id);
                }
                None => {
                    debug!("Empty wallet address after trim, ignoring");
                }
            }
        }

        // Backspace : supprimer le dernier caractère
        Event::Key(_) if is_backspace_event(&event) && app.is_in_input_mode() => {
            app.backspace();
        }

        // Caractères : ajouter au buffer
        Event::Key(_) if is_address_char_event(&event) && app.is_in_input_mode() => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        // ========================================
        // Dashboard
        // ========================================

        // Touche 'q' : quit confirmation two-step
        // CONCEPT : Two-step confirmation pour éviter les quits accidentels
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // 'c' : connecter un wallet (ouvre le mode input)
        Event::Key(_) if is_connect_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            app.cancel_disconnect();
            info!("User requested wallet connect");
            app.start_input("Wallet address: ".to_string());
        }

        // 'd' : déconnecter le wallet (two-step)
        Event::Key(_)
            if is_disconnect_event(&event)
                && app.is_on_dashboard()
                && app.session.is_connected() =>
        {
            app.cancel_quit();
            if app.is_awaiting_disconnect_confirmation() {
                info!("User confirmed disconnect");
                app.disconnect_wallet();
            } else {
                info!("User requested disconnect (awaiting confirmation)");
                app.request_disconnect();
            }
        }

        // 'r' : refresh manuel de la balance
        Event::Key(_)
            if is_refresh_event(&event) && app.is_on_dashboard() && app.session.is_connected() =>
        {
            app.cancel_quit();
            app.cancel_disconnect();
            app.refresh_balance();
        }

        Event::Tick => {
            // Tick régulier : rien à faire pour l'instant
        }

        Event::Key(_) => {
            // Toute autre touche : annule les confirmations si actives
            app.cancel_quit();
            app.cancel_disconnect();
        }

        _ => {
            // Autres événements : ignorés
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup et RAII
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
