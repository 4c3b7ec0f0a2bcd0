//! Engine session: game state, tunable parameters, the opening book and the
//! background search worker.
//!
//! One worker thread is spawned at `init` and joined at `quit`. Commands and
//! the worker talk through a single mutex-guarded cell plus a condvar. A
//! search request goes through a three-step handshake: the caller deposits
//! the request and waits, the worker takes it, publishes a fresh stop flag
//! and acknowledges, and completion is the worker clearing its searching
//! flag. The best-move notification fires exactly once per `go`, from the
//! worker, or from the calling thread when the opening book answers directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::board::{GamePosition, Move, ParseError};
use crate::book::OpeningBook;
use crate::movegen::generate_moves;
use crate::search::eval::EvalWeights;
use crate::search::minimax::Search;
use crate::search::tt::TranspositionTable;
use crate::search::zobrist::Zobrist;

pub const DEFAULT_MAX_DEPTH: u32 = 6;
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(5);
pub const DEFAULT_NAME: &str = "draughtbot";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,
    #[error("engine already initialized")]
    AlreadyInitialized,
    #[error("search in progress")]
    Busy,
    #[error("illegal move {0}")]
    IllegalMove(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid value {value:?} for parameter {name}")]
    InvalidValue { name: String, value: String },
    #[error("cannot start worker thread: {0}")]
    Worker(#[from] std::io::Error),
}

/// Mutex guard that shrugs off poisoning: a panicking worker must never
/// take `stop` or `quit` down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Parameters

pub const PARAMETER_NAMES: [&str; 6] = [
    "material_pawn",
    "material_king",
    "positioning_pawn",
    "positioning_king",
    "crowdness",
    "use_book",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    Int(i32),
    Bool(bool),
}

#[derive(Debug, Clone, Copy)]
struct Parameters {
    weights: EvalWeights,
    use_book: bool,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            weights: EvalWeights::default(),
            use_book: true,
        }
    }
}

impl Parameters {
    /// `None` for unknown names; the protocol treats those as silence, not
    /// as errors.
    fn get(&self, name: &str) -> Option<ParamValue> {
        match name {
            "material_pawn" => Some(ParamValue::Int(self.weights.material_pawn)),
            "material_king" => Some(ParamValue::Int(self.weights.material_king)),
            "positioning_pawn" => Some(ParamValue::Int(self.weights.positioning_pawn)),
            "positioning_king" => Some(ParamValue::Int(self.weights.positioning_king)),
            "crowdness" => Some(ParamValue::Int(self.weights.crowdness)),
            "use_book" => Some(ParamValue::Bool(self.use_book)),
            _ => None,
        }
    }

    /// Sets a parameter from its text value. Unknown names are ignored; a
    /// value that does not parse for a known name is an error.
    fn set(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        let invalid = || EngineError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        let slot = match name {
            "material_pawn" => &mut self.weights.material_pawn,
            "material_king" => &mut self.weights.material_king,
            "positioning_pawn" => &mut self.weights.positioning_pawn,
            "positioning_king" => &mut self.weights.positioning_king,
            "crowdness" => &mut self.weights.crowdness,
            "use_book" => {
                self.use_book = value.parse().map_err(|_| invalid())?;
                return Ok(());
            }
            _ => {
                log::debug!("ignoring unknown parameter {name}");
                return Ok(());
            }
        };

        *slot = value.parse().map_err(|_| invalid())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Worker plumbing

/// Everything a search needs, snapshotted at `go` so foreground parameter
/// changes cannot race a running search.
struct SearchRequest {
    position: GamePosition,
    history: Vec<(GamePosition, Move)>,
    weights: EvalWeights,
    max_depth: u32,
    max_time: Duration,
    play_move: bool,
}

#[derive(Default)]
struct Cell {
    request: Option<SearchRequest>,
    /// Handshake acknowledgement: the worker took the request and the stop
    /// flag below is the one for this search.
    ready: bool,
    searching: bool,
    stop: Option<Arc<AtomicBool>>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    cell: Mutex<Cell>,
    cond: Condvar,
}

/// Game played so far. The history pairs each position with the move played
/// from it, which is what repetition detection needs.
struct Session {
    position: GamePosition,
    history: Vec<(GamePosition, Move)>,
}

pub type Notifier = Arc<dyn Fn(Option<Move>) + Send + Sync>;

pub struct Engine {
    zobrist: Arc<Zobrist>,
    session: Arc<Mutex<Session>>,
    tt: Arc<Mutex<TranspositionTable>>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    params: Parameters,
    book: OpeningBook,
    name: String,
    notifier: Notifier,
}

#[derive(Debug, Clone, Copy)]
pub struct GoOptions {
    pub max_depth: u32,
    pub max_time: Duration,
    pub play_move: bool,
}

impl Default for GoOptions {
    fn default() -> GoOptions {
        GoOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_time: DEFAULT_MAX_TIME,
            play_move: true,
        }
    }
}

impl Engine {
    pub fn new(zobrist: Zobrist, book: OpeningBook, name: String, notifier: Notifier) -> Engine {
        let zobrist = Arc::new(zobrist);
        let position = GamePosition::start(&zobrist);

        Engine {
            zobrist,
            session: Arc::new(Mutex::new(Session {
                position,
                history: Vec::new(),
            })),
            tt: Arc::new(Mutex::new(TranspositionTable::new())),
            shared: Arc::new(Shared::default()),
            worker: None,
            params: Parameters::default(),
            book,
            name,
            notifier,
        }
    }

    /// Engine display name, as answered to `GETNAME`.
    pub fn name(&self) -> Result<&str, EngineError> {
        self.check_initialized()?;
        Ok(&self.name)
    }

    pub fn is_initialized(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_searching(&self) -> bool {
        lock(&self.shared.cell).searching
    }

    /// Position currently on the session board.
    pub fn position(&self) -> GamePosition {
        lock(&self.session).position.clone()
    }

    /// Spawns the worker thread. The engine answers commands only after this.
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.worker.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let zobrist = Arc::clone(&self.zobrist);
        let session = Arc::clone(&self.session);
        let tt = Arc::clone(&self.tt);
        let shared = Arc::clone(&self.shared);
        let notifier = Arc::clone(&self.notifier);

        let handle = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || worker_loop(zobrist, session, tt, shared, notifier))?;

        self.worker = Some(handle);
        log::info!("engine initialized");
        Ok(())
    }

    fn check_initialized(&self) -> Result<(), EngineError> {
        if self.worker.is_none() {
            return Err(EngineError::NotInitialized);
        }
        Ok(())
    }

    fn check_idle(&self) -> Result<(), EngineError> {
        self.check_initialized()?;
        if self.is_searching() {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    /// Starts a fresh game, optionally from a given position with setup
    /// moves already played. The transposition table is cleared. On any
    /// parse or legality failure the previous session is untouched.
    pub fn new_game(
        &mut self,
        position: Option<&str>,
        setup_moves: &[&str],
    ) -> Result<(), EngineError> {
        self.check_idle()?;

        let mut fresh = Session {
            position: match position {
                Some(fen) => GamePosition::from_fen(fen, &self.zobrist)?,
                None => GamePosition::start(&self.zobrist),
            },
            history: Vec::new(),
        };

        for notation in setup_moves {
            apply_checked(&mut fresh, notation, &self.zobrist)?;
        }

        *lock(&self.session) = fresh;
        lock(&self.tt).clear();
        log::info!("new game started");
        Ok(())
    }

    /// Plays one move on the session board after validating it against the
    /// legal-move set.
    pub fn play_move(&mut self, notation: &str) -> Result<(), EngineError> {
        self.check_idle()?;

        let mut session = lock(&self.session);
        apply_checked(&mut session, notation, &self.zobrist)
    }

    /// Starts a search. Returns once the worker has taken the request, so a
    /// later `stop` is guaranteed to reach this search. When the opening
    /// book answers, no search starts and the notification fires before the
    /// call returns.
    pub fn go(&mut self, options: GoOptions) -> Result<(), EngineError> {
        self.check_idle()?;

        if self.params.use_book {
            if let Some(mv) = self.book_move() {
                if options.play_move {
                    let mut session = lock(&self.session);
                    let before = session.position.clone();
                    session.position.apply_move(&mv, &self.zobrist);
                    session.history.push((before, mv));
                }
                log::info!("book move {mv}");
                (self.notifier)(Some(mv));
                return Ok(());
            }
        }

        let request = {
            let session = lock(&self.session);
            SearchRequest {
                position: session.position.clone(),
                history: session.history.clone(),
                weights: self.params.weights,
                max_depth: options.max_depth,
                max_time: options.max_time,
                play_move: options.play_move,
            }
        };

        let mut cell = lock(&self.shared.cell);
        cell.request = Some(request);
        cell.searching = true;
        cell.ready = false;
        self.shared.cond.notify_all();

        while !cell.ready {
            cell = self
                .shared
                .cond
                .wait(cell)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        Ok(())
    }

    /// Book reply for the current position, dropped if it is not actually
    /// legal here.
    fn book_move(&mut self) -> Option<Move> {
        let position = lock(&self.session).position.clone();
        let mv = self.book.lookup(&position)?;

        if generate_moves(&position.board, position.turn).contains(&mv) {
            Some(mv)
        } else {
            log::warn!("book suggested illegal move {mv}, searching instead");
            None
        }
    }

    /// Requests cancellation of the running search. A no-op when idle. Does
    /// not wait; the best-move notification still arrives from the worker.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.check_initialized()?;
        self.signal_stop();
        Ok(())
    }

    fn signal_stop(&self) {
        let cell = lock(&self.shared.cell);
        if cell.searching {
            if let Some(stop) = &cell.stop {
                stop.store(true, Ordering::Relaxed);
                log::debug!("stop requested");
            }
        }
    }

    /// Blocks until no search is running.
    pub fn wait_idle(&self) {
        let mut cell = lock(&self.shared.cell);
        while cell.searching {
            cell = self
                .shared
                .cond
                .wait(cell)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Stops any running search and joins the worker. Never fails; callable
    /// in any state.
    pub fn quit(&mut self) {
        self.signal_stop();

        {
            let mut cell = lock(&self.shared.cell);
            cell.shutdown = true;
            self.shared.cond.notify_all();
        }

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::warn!("worker thread panicked");
            }
        }

        log::info!("engine shut down");
    }

    pub fn parameter_names(&self) -> Result<&'static [&'static str], EngineError> {
        self.check_initialized()?;
        Ok(&PARAMETER_NAMES)
    }

    /// `Ok(None)` for an unknown name; `Err` before `init`.
    pub fn get_parameter(&self, name: &str) -> Result<Option<ParamValue>, EngineError> {
        self.check_initialized()?;
        Ok(self.params.get(name))
    }

    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.check_initialized()?;
        self.params.set(name, value)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.quit();
        }
    }
}

/// Parses and plays one move on a session, rejecting anything outside the
/// legal-move set.
fn apply_checked(
    session: &mut Session,
    notation: &str,
    zobrist: &Zobrist,
) -> Result<(), EngineError> {
    let mv: Move = notation.parse()?;

    let legal = generate_moves(&session.position.board, session.position.turn);
    if !legal.contains(&mv) {
        return Err(EngineError::IllegalMove(notation.to_string()));
    }

    let before = session.position.clone();
    session.position.apply_move(&mv, zobrist);
    session.history.push((before, mv));
    Ok(())
}

fn worker_loop(
    zobrist: Arc<Zobrist>,
    session: Arc<Mutex<Session>>,
    tt: Arc<Mutex<TranspositionTable>>,
    shared: Arc<Shared>,
    notifier: Notifier,
) {
    loop {
        let (request, stop) = {
            let mut cell = lock(&shared.cell);
            loop {
                if cell.shutdown {
                    return;
                }
                if let Some(request) = cell.request.take() {
                    let stop = Arc::new(AtomicBool::new(false));
                    cell.stop = Some(Arc::clone(&stop));
                    cell.ready = true;
                    shared.cond.notify_all();
                    break (request, stop);
                }
                cell = shared
                    .cond
                    .wait(cell)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        let best_shared = Arc::new(Mutex::new(None));

        let (best, _eval) = {
            let mut tt = lock(&tt);
            let mut search = Search::new(
                &zobrist,
                &mut tt,
                request.weights,
                Arc::clone(&stop),
                Arc::clone(&best_shared),
            );
            search.run(
                &request.position,
                &request.history,
                request.max_depth,
                request.max_time,
            )
        };

        if request.play_move {
            if let Some(mv) = best {
                let mut session = lock(&session);
                // The session cannot have changed since `go` snapshotted it;
                // mutating commands are rejected while a search runs
                let before = session.position.clone();
                session.position.apply_move(&mv, &zobrist);
                session.history.push((before, mv));
            }
        }

        // Notify before clearing the searching flag, so anyone woken by
        // `wait_idle` already has the best move in hand
        notifier(best);

        {
            let mut cell = lock(&shared.cell);
            cell.searching = false;
            cell.stop = None;
            shared.cond.notify_all();
        }
    }
}
