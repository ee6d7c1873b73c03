use picsweep::catalog::FsCatalog;
use picsweep::cli::{AppConfig, Args};
use picsweep::config::UserConfig;
use picsweep::deletion::{
    CommitStart, ConsentGate, DeletionAuthority, DeletionCoordinator, DryRunAuthority,
    TrashAuthority,
};
use picsweep::domain::{Decision, TriageEngine};
use picsweep::persist::{JsonFileStore, PersistenceBridge};
use picsweep::tui::{
    handle_confirm_input, handle_key_event, render, render_confirm_delete_overlay,
    render_help_overlay, render_review_overlay, render_summary, render_welcome_overlay, KeyAction,
    SessionTally, ViewState,
};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;
use std::{io, time::Duration};

fn main() -> io::Result<()> {
    // Keep stdout clean for the TUI; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("picsweep=warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    // Run the app
    run_app_with_config(&config)
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig) -> io::Result<()> {
    // Resolve where session state lives
    let state_path = config
        .state_file
        .clone()
        .or_else(JsonFileStore::default_path);
    let Some(state_path) = state_path else {
        eprintln!("Error: could not determine a session file path; pass --state-file");
        std::process::exit(1);
    };

    let bridge = PersistenceBridge::new(Arc::new(JsonFileStore::new(state_path)));

    // Restore the previous session unless --fresh was given
    let restored = if config.fresh { None } else { bridge.restore() };

    let catalog = FsCatalog::new(&config.directory);
    let mut engine = TriageEngine::new(catalog).with_persistence(bridge);

    let loaded = match restored {
        Some(snapshot) => engine.restore_session(snapshot).or_else(|e| {
            tracing::warn!(error = %e, "failed to restore session, starting fresh");
            engine.load(config.filter)
        }),
        None => engine.load(config.filter),
    };
    if let Err(e) = loaded {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if engine.state().is_empty() {
        println!(
            "No media found in directory: {}",
            config.directory.display()
        );
        println!("(Filter '{}' is active - try --filter all)", config.filter.as_str());
        return Ok(());
    }

    // Load user configuration
    let mut user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    // Pick the deletion authority; dry runs never touch the trash and
    // skip confirmation, everything else goes through the consent gate
    // unless confirmation is disabled
    let confirm = !config.skip_confirm && user_config.confirm_before_delete;
    let authority: Box<dyn DeletionAuthority> = match (config.dry_run, confirm) {
        (true, _) => Box::new(DryRunAuthority),
        (false, true) => Box::new(ConsentGate(TrashAuthority)),
        (false, false) => Box::new(TrashAuthority),
    };
    let mut coordinator = DeletionCoordinator::new(authority);

    // Print dry-run notice
    if config.dry_run {
        println!("[DRY RUN] Nothing will be moved to trash");
        println!("   Found {} items to review", engine.state().len());
        println!("   Press Enter to continue...");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(
        &mut terminal,
        &mut engine,
        &mut coordinator,
        config,
        &mut user_config,
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Make sure the final session state is on disk
    engine.flush_save();

    if config.dry_run {
        println!("\n[DRY RUN] Complete");
        println!(
            "   Would have deleted: {} items",
            engine.state().pending_trash.len()
        );
    }

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    engine: &mut TriageEngine<FsCatalog>,
    coordinator: &mut DeletionCoordinator<Box<dyn DeletionAuthority>>,
    config: &AppConfig,
    user_config: &mut UserConfig,
) -> io::Result<()> {
    // Show welcome on first launch or if --welcome flag is set
    let should_show_welcome = config.show_welcome || !user_config.welcome_shown;
    let mut view_state = if should_show_welcome {
        ViewState::Welcome
    } else {
        ViewState::Browsing
    };

    let mut tally = SessionTally::default();
    let mut confirm_count = 0usize;

    loop {
        // Render based on current view state
        terminal.draw(|frame| {
            render(frame, engine.state());

            // Render overlays
            match view_state {
                ViewState::Help => render_help_overlay(frame),
                ViewState::Review => render_review_overlay(frame, engine.state()),
                ViewState::ConfirmDelete => render_confirm_delete_overlay(frame, confirm_count),
                ViewState::Summary => {
                    render_summary(frame, &tally, engine.state().pending_trash.len());
                }
                ViewState::Welcome => render_welcome_overlay(frame),
                ViewState::Browsing => {}
            }
        })?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Handle overlay-specific input
                match view_state {
                    ViewState::Help => {
                        // Any key closes help (or toggle with ?)
                        let action = handle_key_event(key);
                        if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                            view_state = ViewState::Browsing;
                        }
                        continue;
                    }
                    ViewState::Review => {
                        // Any key closes the review overlay
                        view_state = ViewState::Browsing;
                        continue;
                    }
                    ViewState::Summary => {
                        // Any key exits from summary
                        break;
                    }
                    ViewState::ConfirmDelete => {
                        match handle_confirm_input(key) {
                            KeyAction::ConfirmDelete => {
                                if let Some(outcome) = coordinator.deliver_consent(true, engine) {
                                    tally.deleted += outcome.confirmed().len();
                                }
                                view_state = ViewState::Browsing;
                            }
                            KeyAction::CancelDelete => {
                                let _ = coordinator.deliver_consent(false, engine);
                                view_state = ViewState::Browsing;
                            }
                            _ => {}
                        }
                        continue;
                    }
                    ViewState::Welcome => {
                        // Any key dismisses welcome and starts browsing
                        view_state = ViewState::Browsing;

                        // Mark welcome as shown and persist
                        user_config.welcome_shown = true;
                        if let Err(e) = user_config.save() {
                            eprintln!("Warning: Failed to save user config: {}", e);
                        }
                        continue;
                    }
                    ViewState::Browsing => {}
                }

                let action = handle_key_event(key);

                match action {
                    KeyAction::Quit => {
                        // Show summary before quitting if anything happened
                        if tally.kept > 0 || tally.trashed > 0 || tally.deleted > 0 {
                            view_state = ViewState::Summary;
                        } else {
                            break;
                        }
                    }
                    KeyAction::Keep => {
                        if engine.state().current_item().is_some() {
                            engine.keep();
                            tally.kept += 1;
                        }
                    }
                    KeyAction::Trash => {
                        if engine.state().current_item().is_some() {
                            engine.mark_for_trash();
                            tally.trashed += 1;
                        }
                    }
                    KeyAction::Next => {
                        engine.advance();
                    }
                    KeyAction::Previous => {
                        engine.retreat();
                    }
                    KeyAction::Undo => {
                        let last = engine.state().history.last().map(|record| record.decision);
                        if let Some(decision) = last {
                            match decision {
                                Decision::Keep => tally.kept = tally.kept.saturating_sub(1),
                                Decision::Trash => {
                                    tally.trashed = tally.trashed.saturating_sub(1)
                                }
                            }
                            engine.undo();
                        }
                    }
                    KeyAction::CycleFilter => {
                        let next = engine.state().filter.next();
                        if let Err(e) = engine.load(next) {
                            tracing::warn!(error = %e, "failed to switch filter");
                        }
                    }
                    KeyAction::Commit => match coordinator.begin(engine) {
                        CommitStart::NothingPending => {}
                        CommitStart::AwaitingConsent(count) => {
                            confirm_count = count;
                            view_state = ViewState::ConfirmDelete;
                        }
                        CommitStart::Done(outcome) => {
                            tally.deleted += outcome.confirmed().len();
                        }
                    },
                    KeyAction::Review => {
                        let unstaged = engine.unstaged_pending();
                        engine.stage(unstaged);
                        view_state = ViewState::Review;
                    }
                    KeyAction::Help => {
                        view_state = ViewState::Help;
                    }
                    KeyAction::ConfirmDelete | KeyAction::CancelDelete => {
                        // Only meaningful while the confirmation dialog is up
                    }
                    KeyAction::None => {}
                }
            }
        }
    }

    Ok(())
}
