mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use letterdrill::{
    runtime::{Command, CrosstermEventSource, DrillEvent, Runner},
    selection::{FileSelectionStore, SelectionStore},
    session::SessionTally,
    settings::{FileSettingsStore, SettingsStore},
    stats::StatsDb,
    DrillResult, DrillSession, LetterStats, Settings,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;

/// timed letter-recognition drill that adapts to your slowest letters
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A letter-recognition drill: type each target letter as fast as you can. Reactions are graded fast, medium or slow, and letters you answer slowly can be drawn more often."
)]
pub struct Cli {
    /// letters to drill; replaces and saves the current selection
    #[clap(short = 'l', long)]
    letters: Option<String>,

    /// reactions at or under this many ms count as fast
    #[clap(long)]
    fast_ms: Option<u64>,

    /// reactions at or under this many ms count as medium
    #[clap(long)]
    medium_ms: Option<u64>,

    /// reactions slower than this many ms are treated as a pause and not timed
    #[clap(long)]
    pause_ms: Option<u64>,

    /// number of upcoming letters shown after the target
    #[clap(short = 'u', long)]
    upcoming: Option<usize>,

    /// chance (0-100) of drawing from your slowest letters
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    slow_pct: Option<u32>,

    /// how many of your slowest letters the biased draw picks from
    #[clap(long)]
    slow_n: Option<usize>,

    /// seed for a reproducible letter sequence
    #[clap(long)]
    seed: Option<u64>,

    /// forget all recorded letter statistics before starting
    #[clap(long)]
    reset_stats: bool,

    /// write debug logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides; returns true when anything changed
    fn apply_overrides(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        if let Some(v) = self.fast_ms {
            settings.fast_ms = v;
        }
        if let Some(v) = self.medium_ms {
            settings.medium_ms = v;
        }
        if let Some(v) = self.pause_ms {
            settings.pause_ms = v;
        }
        if let Some(v) = self.upcoming {
            settings.upcoming_count = v;
        }
        if let Some(v) = self.slow_pct {
            settings.slow_pct = v;
        }
        if let Some(v) = self.slow_n {
            settings.slow_n = v;
        }
        *settings != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Drilling,
    LetterStats,
}

pub struct App {
    pub pool: Vec<char>,
    pub settings: Settings,
    pub stats: LetterStats,
    pub stats_db: Option<StatsDb>,
    pub session: DrillSession,
    pub tally: SessionTally,
    pub state: AppState,
    seed: Option<u64>,
    runs: u64,
}

impl App {
    pub fn new(
        pool: Vec<char>,
        settings: Settings,
        stats: LetterStats,
        stats_db: Option<StatsDb>,
        seed: Option<u64>,
    ) -> DrillResult<Self> {
        let session = Self::start_session(&pool, &settings, &stats, seed)?;
        Ok(Self {
            pool,
            settings,
            stats,
            stats_db,
            session,
            tally: SessionTally::new(),
            state: AppState::Drilling,
            seed,
            runs: 0,
        })
    }

    fn start_session(
        pool: &[char],
        settings: &Settings,
        stats: &LetterStats,
        seed: Option<u64>,
    ) -> DrillResult<DrillSession> {
        match seed {
            Some(seed) => DrillSession::seeded(pool.to_vec(), settings.upcoming_count, settings, stats, seed),
            None => DrillSession::new(pool.to_vec(), settings.upcoming_count, settings, stats),
        }
    }

    /// Discard the current run and start a fresh one
    pub fn reset(&mut self) -> DrillResult<()> {
        self.runs += 1;
        // Each run of a seeded invocation gets its own reproducible sequence
        let seed = self.seed.map(|s| s.wrapping_add(self.runs));
        self.session = Self::start_session(&self.pool, &self.settings, &self.stats, seed)?;
        self.tally = SessionTally::new();
        self.state = AppState::Drilling;
        info!(run = self.runs, "new run");
        Ok(())
    }

    pub fn on_char(&mut self, c: char) {
        let outcome = self.session.handle_input(c, &self.settings, &self.stats);
        self.stats.record(&outcome);
        self.tally.record(&outcome);
        if let Some(ref db) = self.stats_db {
            if let Err(e) = db.record(&outcome) {
                warn!(error = %e, "failed to record keystroke");
            }
        }
    }

    pub fn toggle_stats(&mut self) {
        self.state = match self.state {
            AppState::Drilling => AppState::LetterStats,
            AppState::LetterStats => AppState::Drilling,
        };
    }
}

fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn open_stats(reset: bool) -> (Option<StatsDb>, LetterStats) {
    let db = match StatsDb::open_default() {
        Ok(db) => db,
        Err(e) => {
            warn!(error = %e, "stats database unavailable; history will not be kept");
            return (None, LetterStats::new());
        }
    };
    if reset {
        if let Err(e) = db.clear_all() {
            warn!(error = %e, "failed to reset stats");
        }
    }
    let stats = db.load_summary().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load stats summary");
        LetterStats::new()
    });
    (Some(db), stats)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.as_deref())?;

    let settings_store = FileSettingsStore::new();
    let mut settings = settings_store.load();
    if cli.apply_overrides(&mut settings) {
        settings_store.save(&settings)?;
    }

    let selection_store = FileSelectionStore::new();
    let mut selection = selection_store.load();
    if let Some(ref letters) = cli.letters {
        selection.set_all(letters);
        selection_store.save(&selection)?;
    }
    let pool = match selection.pool() {
        Ok(pool) => pool,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::MissingRequiredArgument,
                format!("{e} (use --letters, e.g. --letters asdfjkl)"),
            )
            .exit();
        }
    };

    let (stats_db, stats) = open_stats(cli.reset_stats);
    let mut app = App::new(pool, settings, stats, stats_db, cli.seed)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            DrillEvent::Tick => {
                // Keep the letters-per-minute readout moving
                if app.session.has_started() && app.state == AppState::Drilling {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            DrillEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            DrillEvent::Key(key) => {
                match Command::from(key) {
                    Command::Quit => break,
                    Command::ToggleStats => app.toggle_stats(),
                    Command::NewRun => app.reset()?,
                    Command::Type(c) => {
                        if app.state == AppState::Drilling {
                            app.on_char(c);
                        }
                    }
                    Command::Ignore => continue,
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
