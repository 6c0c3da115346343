use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use loadwatch::{
    App, ChannelTransport, MetricsStore, MetricsStream, NotificationBus, Settings, SseTransport,
    ToastQueue,
};

#[derive(Parser, Debug)]
#[command(name = "loadwatch")]
#[command(about = "Operator dashboard for live server metrics")]
struct Args {
    /// Stream endpoint to connect to (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reconnect delay in seconds
    #[arg(long)]
    retry: Option<u64>,

    /// Demo mode: run against a local in-process feed (no server needed)
    #[arg(long, conflicts_with = "connect")]
    demo: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if args.connect.is_some() {
        settings.connect = args.connect;
    }
    if let Some(retry) = args.retry {
        settings.retry_secs = retry;
    }

    // Build the runtime explicitly; the TUI loop runs on the main thread
    // while the stream and toast tasks live on the runtime's workers.
    let rt = tokio::runtime::Runtime::new()?;
    let mut app = rt.block_on(async { build_app(&settings, args.demo) })?;

    run_tui(&mut app)
}

/// Wire the core pipeline: transport -> stream -> store, bus -> toasts.
fn build_app(settings: &Settings, demo: bool) -> Result<App> {
    let store = MetricsStore::new();
    let (bus, requests) = NotificationBus::channel();
    let toasts = ToastQueue::spawn(requests, settings.toast_timings());

    let (events, description) = if demo {
        let (transport, events) = ChannelTransport::create(16);
        tokio::spawn(demo_feed(transport));
        (events, "demo feed".to_string())
    } else {
        let addr = settings.connect.clone().ok_or_else(|| {
            anyhow::anyhow!("no stream endpoint; pass --connect <host:port> or use --demo")
        })?;
        let events = SseTransport::connect(addr.clone(), settings.retry());
        (events, format!("stream: {}", addr))
    };
    let stream = MetricsStream::spawn(events, store.clone());

    Ok(App::new(
        store,
        stream,
        bus,
        toasts,
        settings.stale_window(),
        description,
    ))
}

/// Feed the dashboard with synthetic metrics for local tinkering.
async fn demo_feed(transport: ChannelTransport) {
    transport.open().await;
    let mut requests: i64 = 0;
    let mut written: i64 = 0;
    loop {
        requests += 7;
        written += 23 * 1024;
        transport.metric("request.count", requests).await;
        transport.metric("bytes.write.count", written).await;
        transport.metric("session.count", (requests / 50) % 9).await;
        transport.ping().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}

/// Run the TUI main loop.
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| loadwatch::ui::render(frame, app))?;

        // Poll for input with a short timeout; the draw above doubles as
        // the periodic pull of fresh snapshots.
        if crossterm::event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = crossterm::event::read()? {
                handle_key_event(app, key);
            }
        }
    }
    Ok(())
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('r') => app.reset(),
        _ => {}
    }
}
