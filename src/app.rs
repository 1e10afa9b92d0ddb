use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::args::Args;
use crate::dashboard::Dashboard;
use crate::event::Event;
use crate::slurm::{CommandFetcher, FetchError, FetchService, HttpFetcher, Payload};

#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    /// Command-line args
    pub args: Args,
    /// Latest snapshot and view controls
    pub dashboard: Dashboard,
    /// Source of snapshots
    fetcher: Arc<dyn FetchService>,
    /// Channel on which fetch results are delivered
    events: mpsc::Sender<Event>,
    /// Is a fetch currently in flight?
    fetching: bool,
    /// Time since last refresh was started
    last_update: Option<Instant>,
}

impl App {
    /// Constructs a new instance of [`App`].
    pub fn new(args: Args, events: mpsc::Sender<Event>) -> Self {
        let fetcher: Arc<dyn FetchService> = if args.local {
            Arc::new(CommandFetcher::new(&args.sinfo, &args.squeue))
        } else {
            Arc::new(HttpFetcher::new(&args.url))
        };

        Self::with_fetcher(args, fetcher, events)
    }

    pub fn with_fetcher(
        args: Args,
        fetcher: Arc<dyn FetchService>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            running: true,
            dashboard: Dashboard::new(&args.host),
            args,
            fetcher,
            events,
            fetching: false,
            last_update: None,
        }
    }

    /// Handles the tick event of the terminal.
    pub fn tick(&mut self) -> bool {
        if self.args.interval > 0 {
            self.update(self.args.interval)
        } else {
            false
        }
    }

    /// Starts a refresh if none is in flight and at least `interval` seconds have passed
    pub fn update(&mut self, interval: u64) -> bool {
        // A minimum refresh rate is enforced to prevent the user just holding `r`
        let update_rate = Duration::from_secs(interval.max(1));
        match self.last_update {
            Some(last_update) if last_update.elapsed() < update_rate => false,
            _ => self.refresh(),
        }
    }

    /// Fetches a new snapshot on a worker thread; returns false if a fetch is already in flight
    pub fn refresh(&mut self) -> bool {
        if self.fetching {
            return false;
        }

        debug!(host = %self.dashboard.host, "starting refresh");
        self.fetching = true;
        self.last_update = Some(Instant::now());

        let fetcher = self.fetcher.clone();
        let host = self.dashboard.host.clone();
        let events = self.events.clone();
        thread::spawn(move || {
            let result = fetcher.fetch(&host);
            // The receiver is gone only if the application is shutting down
            let _ = events.send(Event::Fetched(Box::new(result)));
        });

        true
    }

    /// Applies the result of a completed fetch
    pub fn fetched(&mut self, result: Result<Payload, FetchError>) {
        self.fetching = false;
        self.dashboard.apply(result);
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
