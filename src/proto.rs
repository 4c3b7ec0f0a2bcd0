//! Line-based text protocol.
//!
//! One command per line, upper-case verb first. Replies are single lines;
//! `BESTMOVE` is asynchronous and arrives through the engine's notifier,
//! not through the return value of `handle_line`. A failed command answers
//! `ERROR <reason>` and never terminates the loop; only `QUIT` does.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::engine::{Engine, EngineError, GoOptions, ParamValue};

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("bad argument {0:?}")]
    BadArgument(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    NewGame {
        position: Option<String>,
        moves: Vec<String>,
    },
    Move(String),
    Go {
        max_depth: Option<u32>,
        max_time: Option<Duration>,
        play_move: bool,
    },
    Stop,
    GetParameters,
    GetParameter(String),
    SetParameter { name: String, value: String },
    GetName,
    Quit,
}

impl FromStr for Command {
    type Err = ProtoError;

    fn from_str(line: &str) -> Result<Command, ProtoError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(ProtoError::MissingArgument("command"))?;

        match verb {
            "INIT" => Ok(Command::Init),
            "NEWGAME" => {
                let mut position = None;
                let mut moves = Vec::new();
                for token in tokens {
                    // Position notation carries colons, move notation never
                    if token.contains(':') {
                        if position.is_some() || !moves.is_empty() {
                            return Err(ProtoError::BadArgument(token.to_string()));
                        }
                        position = Some(token.to_string());
                    } else {
                        moves.push(token.to_string());
                    }
                }
                Ok(Command::NewGame { position, moves })
            }
            "MOVE" => {
                let notation = tokens.next().ok_or(ProtoError::MissingArgument("move"))?;
                Ok(Command::Move(notation.to_string()))
            }
            "GO" => {
                let mut max_depth = None;
                let mut max_time = None;
                let mut play_move = true;

                while let Some(option) = tokens.next() {
                    match option {
                        "maxdepth" => {
                            let value =
                                tokens.next().ok_or(ProtoError::MissingArgument("maxdepth"))?;
                            max_depth = Some(
                                value
                                    .parse()
                                    .map_err(|_| ProtoError::BadArgument(value.to_string()))?,
                            );
                        }
                        "maxtime" => {
                            let value =
                                tokens.next().ok_or(ProtoError::MissingArgument("maxtime"))?;
                            let secs: u64 = value
                                .parse()
                                .map_err(|_| ProtoError::BadArgument(value.to_string()))?;
                            max_time = Some(Duration::from_secs(secs));
                        }
                        "dontplaymove" => play_move = false,
                        other => return Err(ProtoError::BadArgument(other.to_string())),
                    }
                }

                Ok(Command::Go {
                    max_depth,
                    max_time,
                    play_move,
                })
            }
            "STOP" => Ok(Command::Stop),
            "GETPARAMETERS" => Ok(Command::GetParameters),
            "GETPARAMETER" => {
                let name = tokens.next().ok_or(ProtoError::MissingArgument("name"))?;
                Ok(Command::GetParameter(name.to_string()))
            }
            "SETPARAMETER" => {
                let name = tokens.next().ok_or(ProtoError::MissingArgument("name"))?;
                let value = tokens.next().ok_or(ProtoError::MissingArgument("value"))?;
                Ok(Command::SetParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            }
            "GETNAME" => Ok(Command::GetName),
            "QUIT" => Ok(Command::Quit),
            other => Err(ProtoError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the caller should do after one line: print a reply, print nothing,
/// or leave the loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Silent,
    Quit,
}

pub struct Protocol {
    engine: Engine,
}

impl Protocol {
    pub fn new(engine: Engine) -> Protocol {
        Protocol { engine }
    }

    pub fn handle_line(&mut self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::Silent;
        }

        match line.parse() {
            Ok(command) => self.execute(command).unwrap_or_else(|err| {
                log::debug!("command failed: {err}");
                Outcome::Reply(format!("ERROR {err}"))
            }),
            Err(err) => Outcome::Reply(format!("ERROR {err}")),
        }
    }

    fn execute(&mut self, command: Command) -> Result<Outcome, ProtoError> {
        match command {
            Command::Init => {
                self.engine.init()?;
                Ok(Outcome::Reply("READY".to_string()))
            }
            Command::NewGame { position, moves } => {
                let moves: Vec<&str> = moves.iter().map(String::as_str).collect();
                self.engine.new_game(position.as_deref(), &moves)?;
                Ok(Outcome::Silent)
            }
            Command::Move(notation) => {
                self.engine.play_move(&notation)?;
                Ok(Outcome::Silent)
            }
            Command::Go {
                max_depth,
                max_time,
                play_move,
            } => {
                let defaults = GoOptions::default();
                self.engine.go(GoOptions {
                    max_depth: max_depth.unwrap_or(defaults.max_depth),
                    max_time: max_time.unwrap_or(defaults.max_time),
                    play_move,
                })?;
                Ok(Outcome::Silent)
            }
            Command::Stop => {
                self.engine.stop()?;
                Ok(Outcome::Silent)
            }
            Command::GetParameters => Ok(Outcome::Reply(format!(
                "PARAMETERS {}",
                self.engine.parameter_names()?.join(" ")
            ))),
            Command::GetParameter(name) => match self.engine.get_parameter(&name)? {
                Some(ParamValue::Int(value)) => {
                    Ok(Outcome::Reply(format!("PARAMETER {name} int {value}")))
                }
                Some(ParamValue::Bool(value)) => {
                    Ok(Outcome::Reply(format!("PARAMETER {name} bool {value}")))
                }
                None => Ok(Outcome::Silent),
            },
            Command::SetParameter { name, value } => {
                self.engine.set_parameter(&name, &value)?;
                Ok(Outcome::Silent)
            }
            Command::GetName => Ok(Outcome::Reply(format!("NAME {}", self.engine.name()?))),
            Command::Quit => {
                self.engine.quit();
                Ok(Outcome::Quit)
            }
        }
    }
}

/// Reply line for an asynchronous best-move notification.
pub fn bestmove_line(mv: Option<crate::board::Move>) -> String {
    match mv {
        Some(mv) => format!("BESTMOVE {mv}"),
        None => "BESTMOVE none".to_string(),
    }
}
