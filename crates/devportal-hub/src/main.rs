mod app;

use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use devportal_core::{db, logging};
use devportal_playground::{
    Executor, HttpExecutor, Playground, PlaygroundConfig, PlaygroundView, ReqwestTransport,
};

use app::App;

fn main() -> Result<()> {
    let config = PlaygroundConfig::load(&db::config_path()?)?;
    logging::init_file_logging(&db::data_dir()?.join(logging::LOG_FILE_NAME), &config.log_filter)?;
    tracing::info!(base_url = %config.base_url, "starting devportal");

    // The session store lives exactly as long as the process.
    let store = Rc::new(db::SessionStore::open()?);

    let transport = ReqwestTransport::new(config.request_timeout())?;
    let worker = HttpExecutor::spawn(Executor::new(Arc::new(transport)))?;
    let playground = Playground::new(config.base_url.clone(), config.descriptors.clone(), store.clone())?;
    let view = PlaygroundView::new(playground, worker, store, config.base_url.clone());
    let mut app = App::new(view);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "devportal exited with an error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(TICK_RATE)? {
            app.handle_event(event::read()?);
        }

        // Drains finished requests and advances the spinner.
        app.tick();
    }
}
