use std::io::{self, Read, Seek, Write};

use crate::brackets;
use crate::config::InterpreterConfig;
use crate::error::{BfError, UnmatchedBracketKind};
use crate::io_policy::IoPolicy;
use crate::source::SourceCursor;
use crate::tape::Tape;

/// The eight Brainfuck instructions. Every other byte is a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Increment,
    Decrement,
    Output,
    Input,
    LoopStart,
    LoopEnd,
}

impl Instruction {
    pub fn decode(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Instruction::Right),
            b'<' => Some(Instruction::Left),
            b'+' => Some(Instruction::Increment),
            b'-' => Some(Instruction::Decrement),
            b'.' => Some(Instruction::Output),
            b',' => Some(Instruction::Input),
            b'[' => Some(Instruction::LoopStart),
            b']' => Some(Instruction::LoopEnd),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

/// Result of a single [`Interpreter::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A byte was consumed; `None` when it was not an instruction.
    Executed(Option<Instruction>),
    /// The source is exhausted.
    Halted,
}

/// A streaming Brainfuck interpreter.
///
/// Instructions are fetched one byte at a time from a seekable source; loops
/// are resolved against the stream as they are reached. The interpreter owns:
/// - the source cursor,
/// - a growable tape and the data pointer into it,
/// - the stack of positions of currently entered loops,
/// - the injected input and output streams.
pub struct Interpreter<R, I, O> {
    source: SourceCursor<R>,
    input: I,
    output: O,
    tape: Tape,
    pointer: usize,
    open_loops: Vec<u64>,
    executed: u64,
    policy: IoPolicy,
    config: InterpreterConfig,
}

impl<R, I, O> Interpreter<R, I, O>
where
    R: Read + Seek,
    I: Read,
    O: Write,
{
    /// Create an interpreter over `source` with the given streams.
    ///
    /// Fails with [`BfError::Config`] when `config` does not validate.
    pub fn new(source: R, input: I, output: O, config: InterpreterConfig) -> Result<Self, BfError> {
        config.validate()?;
        Ok(Self {
            source: SourceCursor::new(source),
            input,
            output,
            tape: Tape::new(&config),
            pointer: 0,
            open_loops: Vec::new(),
            executed: 0,
            policy: config.io_policy(),
            config,
        })
    }

    /// Execute until the source is exhausted.
    pub fn run(&mut self) -> Result<(), BfError> {
        while self.step()? != Step::Halted {}
        self.flush()
    }

    /// Fetch, decode and execute one byte of the program.
    pub fn step(&mut self) -> Result<Step, BfError> {
        let Some(byte) = self.source.read_one() else {
            return Ok(Step::Halted);
        };
        self.executed += 1;

        let Some(instr) = Instruction::decode(byte) else {
            return Ok(Step::Executed(None));
        };
        // Offset the instruction was read from.
        let at = self.source.position() - 1;
        log::trace!("{:>6} | ptr {:<6} | cell {:<4} | {}", at, self.pointer, self.current_cell(), instr.as_char());

        match instr {
            Instruction::Right => {
                let next = self.pointer + 1;
                self.tape.ensure_capacity(next)?;
                self.pointer = next;
            }
            Instruction::Left => {
                self.pointer = self.pointer.saturating_sub(1);
            }
            Instruction::Increment => {
                self.tape.add(self.pointer, 1);
            }
            Instruction::Decrement => {
                self.tape.add(self.pointer, -1);
            }
            Instruction::Output => {
                let byte = self.current_cell() as u8;
                self.output
                    .write_all(&[byte])
                    .map_err(|source| BfError::Io { pos: at, source })?;
            }
            Instruction::Input => {
                // Make any prompt visible before blocking on input.
                self.output.flush().map_err(|source| BfError::Io { pos: at, source })?;
                let read = self.read_input();
                let value = if self.policy.is_eof(read) {
                    self.policy.on_eof(self.current_cell(), self.tape.max_value())
                } else {
                    read.map_or(0, u64::from)
                };
                self.tape.write(self.pointer, i128::from(value));
            }
            Instruction::LoopStart => {
                if self.current_cell() == 0 {
                    brackets::skip_forward(&mut self.source, at)?;
                } else {
                    self.open_loops.push(self.source.position());
                }
            }
            Instruction::LoopEnd => {
                let Some(&body) = self.open_loops.last() else {
                    return Err(BfError::UnmatchedBracket { kind: UnmatchedBracketKind::Close, pos: at });
                };
                if self.current_cell() == 0 {
                    self.open_loops.pop();
                } else {
                    brackets::jump_back(&mut self.source, body, at)?;
                }
            }
        }

        Ok(Step::Executed(Some(instr)))
    }

    /// One byte from the input stream. Read errors are treated as EOF.
    fn read_input(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return None,
                Ok(_) => return Some(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("Input read failed: {}; treating as EOF", e);
                    return None;
                }
            }
        }
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<(), BfError> {
        let pos = self.source.position();
        self.output.flush().map_err(|source| BfError::Io { pos, source })
    }

    /// The next program byte, without consuming it.
    pub fn peek_instruction(&mut self) -> Option<u8> {
        self.source.peek()
    }
}

impl<R, I, O> Interpreter<R, I, O> {
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn current_cell(&self) -> u64 {
        self.tape.read(self.pointer)
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Bytes consumed from the source so far, comments included.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Current offset into the source.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    /// Number of loops currently entered.
    pub fn loop_depth(&self) -> usize {
        self.open_loops.len()
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
