//! The textual command stream: parsing, validation and dispatch. This layer
//! owns the collected sum results and checks every argument against the live
//! sequence length, so the engine itself is never called out of bounds.

use std::io::{self, Write};

use thiserror::Error;

use crate::seq::Sequence;

/// One operation from the command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sum { l: usize, r: usize },
    Insert { pos: usize, value: i64 },
    Remove { pos: usize },
    Assign { value: i64, l: usize, r: usize },
    Add { delta: i64, l: usize, r: usize },
    NextPermutation { l: usize, r: usize },
    PrevPermutation { l: usize, r: usize },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("bad integer token {token:?}")]
    BadToken { token: String },
    #[error("unknown opcode {0}")]
    UnknownOpcode(i64),
    #[error("position {pos} out of range for sequence of length {len}")]
    PosOutOfRange { pos: usize, len: usize },
    #[error("invalid range {l}..={r} for sequence of length {len}")]
    RangeOutOfRange { l: usize, r: usize, len: usize },
}

struct Tokens<'a>(std::str::SplitAsciiWhitespace<'a>);

impl Tokens<'_> {
    fn next_i64(&mut self) -> Result<i64, CommandError> {
        let token = self.0.next().ok_or(CommandError::UnexpectedEof)?;
        token.parse().map_err(|_| CommandError::BadToken {
            token: token.to_owned(),
        })
    }
    fn next_usize(&mut self) -> Result<usize, CommandError> {
        let token = self.0.next().ok_or(CommandError::UnexpectedEof)?;
        token.parse().map_err(|_| CommandError::BadToken {
            token: token.to_owned(),
        })
    }
}

/// The initial sequence plus the commands to run on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub initial: Vec<i64>,
    pub commands: Vec<Command>,
}

impl Program {
    /// Parses the whitespace-separated format: `n`, `n` values, `q`, then `q`
    /// commands of the form `op args..`.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let mut toks = Tokens(input.split_ascii_whitespace());
        let n = toks.next_usize()?;
        let initial = (0..n)
            .map(|_| toks.next_i64())
            .collect::<Result<Vec<_>, _>>()?;
        let q = toks.next_usize()?;
        let mut commands = Vec::with_capacity(q);
        for _ in 0..q {
            let op = toks.next_i64()?;
            commands.push(match op {
                1 => Command::Sum {
                    l: toks.next_usize()?,
                    r: toks.next_usize()?,
                },
                2 => Command::Insert {
                    value: toks.next_i64()?,
                    pos: toks.next_usize()?,
                },
                3 => Command::Remove {
                    pos: toks.next_usize()?,
                },
                4 => Command::Assign {
                    value: toks.next_i64()?,
                    l: toks.next_usize()?,
                    r: toks.next_usize()?,
                },
                5 => Command::Add {
                    delta: toks.next_i64()?,
                    l: toks.next_usize()?,
                    r: toks.next_usize()?,
                },
                6 => Command::NextPermutation {
                    l: toks.next_usize()?,
                    r: toks.next_usize()?,
                },
                7 => Command::PrevPermutation {
                    l: toks.next_usize()?,
                    r: toks.next_usize()?,
                },
                op => return Err(CommandError::UnknownOpcode(op)),
            });
        }
        Ok(Self { initial, commands })
    }
}

/// Results of running a [`Program`]: the sum answers in command order, then
/// the final sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub sums: Vec<i64>,
    pub sequence: Vec<i64>,
}

impl Output {
    /// One sum per line, then the sequence space-separated on a final line.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        for s in &self.sums {
            writeln!(w, "{s}")?;
        }
        for v in &self.sequence {
            write!(w, "{v} ")?;
        }
        writeln!(w)
    }
}

fn check_range(l: usize, r: usize, len: usize) -> Result<(), CommandError> {
    if l <= r && r < len {
        Ok(())
    } else {
        Err(CommandError::RangeOutOfRange { l, r, len })
    }
}

/// Runs the program on a fresh sequence. Any command with out-of-range
/// arguments aborts the run before the engine is touched by it.
pub fn run<S: Sequence>(program: &Program) -> Result<Output, CommandError> {
    let mut seq = S::from_values(program.initial.iter().copied());
    let mut sums = Vec::new();
    for &command in &program.commands {
        let len = seq.len();
        match command {
            Command::Sum { l, r } => {
                check_range(l, r, len)?;
                sums.push(seq.sum(l, r));
            }
            Command::Insert { pos, value } => {
                if pos > len {
                    return Err(CommandError::PosOutOfRange { pos, len });
                }
                seq.insert(pos, value);
            }
            Command::Remove { pos } => {
                if pos >= len {
                    return Err(CommandError::PosOutOfRange { pos, len });
                }
                seq.remove(pos);
            }
            Command::Assign { value, l, r } => {
                check_range(l, r, len)?;
                seq.assign(value, l, r);
            }
            Command::Add { delta, l, r } => {
                check_range(l, r, len)?;
                seq.add(delta, l, r);
            }
            Command::NextPermutation { l, r } => {
                check_range(l, r, len)?;
                seq.next_permutation(l, r);
            }
            Command::PrevPermutation { l, r } => {
                check_range(l, r, len)?;
                seq.prev_permutation(l, r);
            }
        }
    }
    let sequence = seq.extract();
    Ok(Output { sums, sequence })
}
