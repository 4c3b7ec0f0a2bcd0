use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use draughtbot::book::OpeningBook;
use draughtbot::engine::{Engine, Notifier, DEFAULT_NAME};
use draughtbot::proto::{bestmove_line, Outcome, Protocol};
use draughtbot::search::zobrist::{Zobrist, DEFAULT_SEED};

#[derive(Parser, Debug)]
#[command(name = "draughtbot", version, about = "Draughts engine speaking a line protocol on stdin/stdout")]
struct Args {
    /// Opening book file (JSON); the built-in table is used when omitted
    #[arg(long)]
    book: Option<PathBuf>,

    /// Seed for the Zobrist table and book move selection
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Engine name reported by GETNAME
    #[arg(long, default_value = DEFAULT_NAME)]
    name: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let book = match &args.book {
        Some(path) => OpeningBook::load(path, args.seed)?,
        None => OpeningBook::builtin(args.seed),
    };

    // Best moves arrive from the worker thread; write them straight to
    // stdout under its lock so they never interleave with command replies
    let notifier: Notifier = Arc::new(|mv| {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", bestmove_line(mv));
        let _ = stdout.flush();
    });

    let engine = Engine::new(Zobrist::new(args.seed), book, args.name, notifier);
    let mut protocol = Protocol::new(engine);

    for line in io::stdin().lock().lines() {
        match protocol.handle_line(&line?) {
            Outcome::Reply(reply) => println!("{reply}"),
            Outcome::Silent => {}
            Outcome::Quit => break,
        }
    }

    Ok(())
}
