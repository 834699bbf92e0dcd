use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use stream_bf::cli_util::{print_run_error, Excerpt};
use stream_bf::{
    BfError, CellWidth, EofMode, Instruction, Interpreter, RunOutcome, Settings, StepControl, StopReason,
};

/// Cells shown by `--stats`.
const STATS_CELLS: usize = 10;

/// How long to wait for the worker to notice a cancellation.
const CANCEL_GRACE: Duration = Duration::from_millis(250);

/// How often the main thread checks for Ctrl+C while the worker runs.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// What ',' stores on end of input: zero, max or unchanged
    #[arg(long = "eof", value_name = "MODE")]
    pub eof: Option<EofMode>,

    /// Treat a newline on input as end of input
    #[arg(long = "newline-eof")]
    pub newline_eof: bool,

    /// Initial tape length in cells
    #[arg(long = "tape-size", value_name = "CELLS")]
    pub tape_size: Option<usize>,

    /// Hard limit on the tape length in cells
    #[arg(long = "tape-limit", value_name = "CELLS")]
    pub tape_limit: Option<usize>,

    /// Cells added each time the pointer reaches the end of the tape
    #[arg(long = "growth", value_name = "CELLS")]
    pub growth: Option<usize>,

    /// Cell width in bits: 8, 16, 32 or 64
    #[arg(long = "cell-bits", value_name = "BITS")]
    pub cell_bits: Option<u32>,

    /// Saturate cell values instead of wrapping
    #[arg(long = "no-wrap")]
    pub no_wrap: bool,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Print each instruction to stderr before it executes
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Print instruction count, timing and the first tape cells after the run
    #[arg(long = "stats")]
    pub stats: bool,

    /// Print the first N tape cells after the run
    #[arg(long = "dump", value_name = "N")]
    pub dump: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Why the main thread stopped waiting on the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitStop {
    Finished,
    TimedOut,
    Interrupted,
}

/// What the worker thread hands back once the interpreter stops.
struct RunReport {
    result: Result<RunOutcome<StopReason>, BfError>,
    executed: u64,
    elapsed: Duration,
    cells: Vec<u64>,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.file.is_none() && args.code.is_empty() {
        usage_and_exit(program, 2);
    }

    if args.file.is_some() && !args.code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let settings = match resolve_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            print_run_error(Some(program), None, &e);
            return 2;
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let control = StepControl::new(settings.max_steps, cancel.clone());

    // Ctrl+C stops the run at the next step boundary
    let interrupted = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed)) {
        log::warn!("failed to set ctrl+c handler: {e}");
    }

    let keep_cells = if args.stats { args.dump.unwrap_or(0).max(STATS_CELLS) } else { args.dump.unwrap_or(0) };

    let rx = match &args.file {
        Some(path) => match File::open(path) {
            Ok(file) => spawn_worker(file, settings.clone(), control, args.trace, keep_cells),
            Err(e) => {
                eprintln!("{program}: failed to open code file {}: {e}", path.display());
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => {
            let code = Cursor::new(args.code.join("").into_bytes());
            spawn_worker(code, settings.clone(), control, args.trace, keep_cells)
        }
    };

    let (received, stop) = wait_for_worker(&rx, &cancel, settings.timeout_ms);
    let timed_out = stop == WaitStop::TimedOut;

    let exit_code = match (&received, stop) {
        (Some(report), _) => report_outcome(program, &args, report, settings.timeout_ms, timed_out),
        // The worker is stuck (e.g. blocked on stdin); give up on it.
        (None, WaitStop::TimedOut) => {
            report_timeout(settings.timeout_ms);
            1
        }
        (None, WaitStop::Interrupted) => {
            report_interrupted();
            130
        }
        (None, WaitStop::Finished) => 1,
    };

    if let Some(report) = &received {
        if args.stats {
            print_stats(report);
        }
        if let Some(n) = args.dump {
            print_cells(&report.cells[..n.min(report.cells.len())]);
        }
    }

    exit_code
}

/// Wait for the worker's report, polling so that Ctrl+C and the wall-clock
/// timeout are honored even while the worker is blocked on input. Once either
/// fires, the worker gets [`CANCEL_GRACE`] to stop on its own.
fn wait_for_worker(
    rx: &mpsc::Receiver<RunReport>,
    cancel: &AtomicBool,
    timeout_ms: Option<u64>,
) -> (Option<RunReport>, WaitStop) {
    let deadline = timeout_ms.and_then(|ms| Instant::now().checked_add(Duration::from_millis(ms)));

    loop {
        let wait = match deadline {
            Some(deadline) => POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())),
            None => POLL_INTERVAL,
        };
        match rx.recv_timeout(wait) {
            Ok(report) => return (Some(report), WaitStop::Finished),
            Err(mpsc::RecvTimeoutError::Disconnected) => return (None, WaitStop::Finished),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        let stop = if cancel.load(Ordering::Relaxed) {
            WaitStop::Interrupted
        } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            cancel.store(true, Ordering::Relaxed);
            WaitStop::TimedOut
        } else {
            continue;
        };
        log::debug!("Waiting {:?} for the interpreter to stop ({:?})", CANCEL_GRACE, stop);
        return (rx.recv_timeout(CANCEL_GRACE).ok(), stop);
    }
}

fn resolve_settings(args: &RunArgs) -> Result<Settings, BfError> {
    // Resolve: flags -> env -> config file -> defaults
    let mut settings = Settings::load();
    let cfg = &mut settings.interpreter;

    if let Some(n) = args.tape_size { cfg.initial_size = n; }
    if args.tape_limit.is_some() { cfg.size_limit = args.tape_limit; }
    if let Some(n) = args.growth { cfg.growth = n; }
    if let Some(bits) = args.cell_bits {
        let width = CellWidth::from_bits(bits)?;
        cfg.cell_width = width;
        cfg.value_space = width.value_space();
    }
    if args.no_wrap { cfg.wrap_around = false; }
    if let Some(mode) = args.eof { cfg.eof_mode = mode; }
    if args.newline_eof { cfg.newline_as_eof = true; }
    cfg.validate()?;

    if args.max_steps.is_some() { settings.max_steps = args.max_steps; }
    if args.timeout_ms.is_some() { settings.timeout_ms = args.timeout_ms; }
    Ok(settings)
}

fn spawn_worker<R>(
    source: R,
    settings: Settings,
    control: StepControl,
    trace: bool,
    keep_cells: usize,
) -> mpsc::Receiver<RunReport>
where
    R: Read + Seek + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<RunReport>();

    thread::spawn(move || {
        let output = BufWriter::new(io::stdout());
        let started = Instant::now();
        let report = match Interpreter::new(source, io::stdin(), output, settings.interpreter) {
            Ok(mut bf) => {
                if trace {
                    eprintln!("POS    | PTR        | CELL   | INSTR");
                    eprintln!("-------+------------+--------+------");
                }
                let result = bf.run_with_hook(|bf| {
                    if trace {
                        trace_next(bf);
                    }
                    control.check(bf.executed())
                });
                let cells = bf.tape().cells();
                RunReport {
                    result,
                    executed: bf.executed(),
                    elapsed: started.elapsed(),
                    cells: cells[..keep_cells.min(cells.len())].to_vec(),
                }
            }
            Err(e) => RunReport {
                result: Err(e),
                executed: 0,
                elapsed: started.elapsed(),
                cells: Vec::new(),
            },
        };
        let _ = tx.send(report);
    });

    rx
}

fn trace_next<R, I, O>(bf: &mut Interpreter<R, I, O>)
where
    R: Read + Seek,
    I: Read,
    O: Write,
{
    if let Some(instr) = bf.peek_instruction().and_then(Instruction::decode) {
        eprintln!(
            "{:<6} | {:<10} | {:<6} | {}",
            bf.position(),
            bf.pointer(),
            bf.current_cell(),
            instr.as_char()
        );
    }
}

fn report_outcome(program: &str, args: &RunArgs, report: &RunReport, timeout_ms: Option<u64>, timed_out: bool) -> i32 {
    match &report.result {
        Ok(RunOutcome::Halted) => 0,
        Ok(RunOutcome::Stopped(StopReason::StepLimit(limit))) => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
            let _ = io::stderr().flush();
            1
        }
        Ok(RunOutcome::Stopped(StopReason::Cancelled)) if timed_out => {
            report_timeout(timeout_ms);
            1
        }
        Ok(RunOutcome::Stopped(StopReason::Cancelled)) => {
            report_interrupted();
            130
        }
        Err(err) => {
            let code = match &args.file {
                Some(path) => err
                    .position()
                    .and_then(|pos| File::open(path).and_then(|file| Excerpt::read_around(file, pos)).ok()),
                None => Some(Excerpt::whole(args.code.join("").as_bytes())),
            };
            print_run_error(Some(program), code.as_ref(), err);
            1
        }
    }
}

fn report_timeout(timeout_ms: Option<u64>) {
    eprintln!("Execution aborted: wall-clock timeout exceeded ({} ms)", timeout_ms.unwrap_or(0));
    let _ = io::stderr().flush();
}

fn report_interrupted() {
    eprintln!("Execution aborted: interrupted");
    let _ = io::stderr().flush();
}

fn print_stats(report: &RunReport) {
    let secs = report.elapsed.as_secs_f64();
    eprintln!();
    eprintln!("executed: {} instruction(s)", report.executed);
    eprintln!("elapsed:  {:.6} s", secs);
    if secs > 0.0 {
        eprintln!("rate:     {:.0} instruction(s) per second", report.executed as f64 / secs);
    }
    print_cells(&report.cells[..STATS_CELLS.min(report.cells.len())]);
}

fn print_cells(cells: &[u64]) {
    eprintln!("cells[0..{}]: {:?}", cells.len(), cells);
    let _ = io::stderr().flush();
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>    Read Brainfuck code from PATH instead of positional "<code>"
  --eof <MODE>          What ',' stores on end of input: zero, max or unchanged
  --newline-eof         Treat a newline on input as end of input
  --tape-size <CELLS>   Initial tape length (default 300000)
  --tape-limit <CELLS>  Hard limit on the tape length (default unbounded)
  --growth <CELLS>      Cells added when the pointer reaches the end (default 1000)
  --cell-bits <BITS>    Cell width: 8, 16, 32 or 64 (default 8)
  --no-wrap             Saturate cell values instead of wrapping
  --max-steps <N>       Abort after N executed instructions
  --timeout <MS>        Abort after MS milliseconds of wall-clock time
  --trace, -t           Print each instruction to stderr before it executes
  --stats               Print instruction count, timing and the first tape cells
  --dump <N>            Print the first N tape cells after the run
  --help,  -h           Show this help

Notes:
- The program is executed straight off the file; it is never loaded whole.
- Characters outside of Brainfuck's ><+-.,[] are comments.
- Input (`,`) reads a single byte from stdin.
- Settings fall back to BF_* environment variables, then to $XDG_CONFIG_HOME/bf.toml.

Examples:
- Run a program from a file:
    {0} run --file ./program.bf
- Echo stdin until end of input, storing 0 on EOF:
    {0} run --eof zero ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
