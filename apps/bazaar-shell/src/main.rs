//! # Bazaar Shell Entry Point
//!
//! Headless run of the client: loads configuration, opens local storage,
//! walks the splash → login/onboarding/home bootstrap and, when the user is
//! already signed in, loads the first page of the home feed.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load `bazaar.toml` (or defaults) and `BAZAAR_*` overrides
//! 3. Connect to database & run migrations, restore the cart
//! 4. Load preferences
//! 5. Resolve the first screen

use std::process::ExitCode;

use tracing::{error, info};

use bazaar_core::UiState;
use bazaar_shell::state::ShellConfig;
use bazaar_shell::{init_tracing, App};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    info!("Starting Bazaar shell");

    let config = ShellConfig::load_or_default(None);

    let app = match App::start(config).await {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let state = app.bootstrap().await;
    info!(route = %state.route(), "Initial screen");

    match app.feed.current() {
        UiState::Success(page) => info!(
            shown = page.products.len(),
            total = page.total,
            "Home feed loaded"
        ),
        UiState::Failure(message) => error!(%message, "Home feed failed"),
        UiState::Idle | UiState::Loading => {}
    }

    app.shutdown().await;
    ExitCode::SUCCESS
}
