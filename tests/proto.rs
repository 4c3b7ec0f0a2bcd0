use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use draughtbot::book::OpeningBook;
use draughtbot::engine::{Engine, Notifier};
use draughtbot::proto::{bestmove_line, Command, Outcome, Protocol};
use draughtbot::search::zobrist::Zobrist;

fn protocol() -> Protocol {
    let notifier: Notifier = Arc::new(|_| {});
    Protocol::new(Engine::new(
        Zobrist::default(),
        OpeningBook::builtin(7),
        "testbot".to_string(),
        notifier,
    ))
}

#[test]
fn command_parsing() {
    assert_eq!("INIT".parse::<Command>().unwrap(), Command::Init);
    assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Quit);
    assert_eq!(
        "MOVE 11-15".parse::<Command>().unwrap(),
        Command::Move("11-15".to_string())
    );
    assert_eq!(
        "NEWGAME W:B14:W22 14-18 22-17".parse::<Command>().unwrap(),
        Command::NewGame {
            position: Some("W:B14:W22".to_string()),
            moves: vec!["14-18".to_string(), "22-17".to_string()],
        }
    );
    assert_eq!(
        "GO maxdepth 4 maxtime 9 dontplaymove".parse::<Command>().unwrap(),
        Command::Go {
            max_depth: Some(4),
            max_time: Some(Duration::from_secs(9)),
            play_move: false,
        }
    );
    assert_eq!(
        "SETPARAMETER use_book false".parse::<Command>().unwrap(),
        Command::SetParameter {
            name: "use_book".to_string(),
            value: "false".to_string(),
        }
    );
}

#[test]
fn bad_commands_fail_to_parse() {
    assert!("HELLO".parse::<Command>().is_err());
    assert!("MOVE".parse::<Command>().is_err());
    assert!("GO maxdepth".parse::<Command>().is_err());
    assert!("GO maxdepth four".parse::<Command>().is_err());
    assert!("GO sideways".parse::<Command>().is_err());
    assert!("SETPARAMETER use_book".parse::<Command>().is_err());
    // A second position in one NEWGAME makes no sense
    assert!("NEWGAME B:B1:W32 B:B2:W31".parse::<Command>().is_err());
}

#[test]
fn init_replies_ready() {
    let mut protocol = protocol();
    assert_eq!(
        protocol.handle_line("INIT"),
        Outcome::Reply("READY".to_string())
    );
    assert_eq!(protocol.handle_line("QUIT"), Outcome::Quit);
}

#[test]
fn errors_are_replies_not_failures() {
    let mut protocol = protocol();

    match protocol.handle_line("BOGUS") {
        Outcome::Reply(reply) => assert!(reply.starts_with("ERROR "), "{reply}"),
        other => panic!("expected an error reply, got {other:?}"),
    }

    // Commands before INIT are errors too, and the loop survives them
    for line in [
        "MOVE 11-15",
        "STOP",
        "GETNAME",
        "GETPARAMETERS",
        "GETPARAMETER use_book",
        "SETPARAMETER use_book false",
    ] {
        match protocol.handle_line(line) {
            Outcome::Reply(reply) => assert!(reply.starts_with("ERROR "), "{line}: {reply}"),
            other => panic!("expected an error reply for {line}, got {other:?}"),
        }
    }

    assert_eq!(
        protocol.handle_line("INIT"),
        Outcome::Reply("READY".to_string())
    );
}

#[test]
fn blank_lines_are_ignored() {
    let mut protocol = protocol();
    assert_eq!(protocol.handle_line(""), Outcome::Silent);
    assert_eq!(protocol.handle_line("   "), Outcome::Silent);
}

#[test]
fn parameter_commands() {
    let mut protocol = protocol();
    protocol.handle_line("INIT");

    assert_eq!(
        protocol.handle_line("GETPARAMETERS"),
        Outcome::Reply(
            "PARAMETERS material_pawn material_king positioning_pawn \
             positioning_king crowdness use_book"
                .to_string()
        )
    );

    assert_eq!(
        protocol.handle_line("GETPARAMETER material_king"),
        Outcome::Reply("PARAMETER material_king int 160".to_string())
    );
    assert_eq!(
        protocol.handle_line("GETPARAMETER use_book"),
        Outcome::Reply("PARAMETER use_book bool true".to_string())
    );

    // Unknown parameters answer nothing at all
    assert_eq!(
        protocol.handle_line("GETPARAMETER no_such_thing"),
        Outcome::Silent
    );
    assert_eq!(
        protocol.handle_line("SETPARAMETER no_such_thing 5"),
        Outcome::Silent
    );

    assert_eq!(
        protocol.handle_line("SETPARAMETER crowdness 11"),
        Outcome::Silent
    );
    assert_eq!(
        protocol.handle_line("GETPARAMETER crowdness"),
        Outcome::Reply("PARAMETER crowdness int 11".to_string())
    );

    match protocol.handle_line("SETPARAMETER crowdness lots") {
        Outcome::Reply(reply) => assert!(reply.starts_with("ERROR "), "{reply}"),
        other => panic!("expected an error reply, got {other:?}"),
    }
}

#[test]
fn getname_reports_the_engine_name() {
    let mut protocol = protocol();
    protocol.handle_line("INIT");
    assert_eq!(
        protocol.handle_line("GETNAME"),
        Outcome::Reply("NAME testbot".to_string())
    );
}

#[test]
fn moves_and_newgame_flow() {
    let mut protocol = protocol();
    protocol.handle_line("INIT");

    assert_eq!(protocol.handle_line("NEWGAME"), Outcome::Silent);
    assert_eq!(protocol.handle_line("MOVE 11-15"), Outcome::Silent);

    match protocol.handle_line("MOVE 11-15") {
        Outcome::Reply(reply) => assert!(reply.starts_with("ERROR "), "{reply}"),
        other => panic!("expected an error reply, got {other:?}"),
    }

    assert_eq!(
        protocol.handle_line("NEWGAME W:B14:W22"),
        Outcome::Silent
    );
}

#[test]
fn bestmove_lines() {
    let mv = "11-15".parse().unwrap();
    assert_eq!(bestmove_line(Some(mv)), "BESTMOVE 11-15");
    assert_eq!(bestmove_line(None), "BESTMOVE none");
}
