//! `rozgar`: terminal client for the Rozgar job board.
//!
//! # Usage
//!
//! ```
//! rozgar --url https://xyz.supabase.co --api-key <anon key>
//! rozgar --offline
//! rozgar --config ~/.config/rozgar/config.toml
//! ```
//!
//! Without a backend URL and key the client runs offline on a local SQLite
//! database seeded with demo accounts.

mod app;
mod ui;

use std::{
  fs::{self, OpenOptions},
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::Tui;
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rozgar_app::{
  App,
  config::{BackendMode, ClientConfig},
  persist::Persistence,
};
use rozgar_core::Backend;
use rozgar_remote::{RemoteBackend, RemoteConfig};
use rozgar_store_sqlite::SqliteBackend;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rozgar", author, version, about = "Terminal client for the Rozgar job board")]
struct Args {
  /// Path to a config file (backend_url, api_key, data_dir, seed_demo).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Hosted backend project URL.
  #[arg(long, env = "ROZGAR_BACKEND_URL")]
  url: Option<String>,

  /// Public API key for the hosted backend.
  #[arg(long, env = "ROZGAR_API_KEY")]
  api_key: Option<String>,

  /// Where the local database, saved session and log live.
  #[arg(long, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  /// Use the local database even if a backend is configured.
  #[arg(long)]
  offline: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let mut config = ClientConfig::load(args.config.as_deref()).context("reading configuration")?;
  // Flags override the file and environment.
  if args.url.is_some() {
    config.backend_url = args.url;
  }
  if args.api_key.is_some() {
    config.api_key = args.api_key;
  }
  if let Some(dir) = args.data_dir {
    config.data_dir = dir;
  }

  let data_dir = config.data_dir();
  fs::create_dir_all(&data_dir)
    .with_context(|| format!("creating data directory {}", data_dir.display()))?;
  init_tracing(&data_dir)?;

  let mode = if args.offline { BackendMode::Offline } else { config.backend_mode() };
  let persistence = Persistence::in_dir(&data_dir);

  match mode {
    BackendMode::Hosted { url, api_key } => {
      tracing::info!(%url, "using hosted backend");
      let backend = RemoteBackend::new(RemoteConfig {
        base_url: url,
        api_key,
        timeout: config.request_timeout(),
      })
      .context("building HTTP client")?;
      run(backend, persistence, false).await
    }
    BackendMode::Offline => {
      let path = data_dir.join("rozgar.db");
      tracing::info!(path = %path.display(), "using local database");
      let backend = SqliteBackend::open(&path)
        .await
        .with_context(|| format!("opening database at {}", path.display()))?;
      if config.seed_demo && backend.seed_demo().await.context("seeding demo data")? {
        tracing::info!("loaded demo accounts");
      }
      run(backend, persistence, true).await
    }
  }
}

/// Log to `<data_dir>/rozgar.log`; the terminal belongs to the UI.
fn init_tracing(data_dir: &Path) -> Result<()> {
  let path = data_dir.join("rozgar.log");
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

async fn run<B: Backend>(backend: B, persistence: Persistence, offline: bool) -> Result<()> {
  let app = App::start(Arc::new(backend), persistence);
  let mut tui = Tui::new(app, offline);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;

  // Restore the terminal even on error.
  let result = run_event_loop(&mut terminal, &mut tui).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  tui.app.shutdown();
  result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<B: Backend>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  tui: &mut Tui<B>,
) -> Result<()> {
  loop {
    tui.sync().await;
    terminal.draw(|f| ui::draw(f, tui)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !tui.handle_key(key).await?
    {
      break;
    }
  }
  Ok(())
}
