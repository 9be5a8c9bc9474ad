use anyhow::Result;
use crossbeam_channel::Sender;
use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Which signal asked the process to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn exit_code(self) -> ExitCode {
        match self {
            ShutdownSignal::Interrupt => ExitCode::SignalInt,
            ShutdownSignal::Terminate => ExitCode::SignalTerm,
        }
    }
}

const NO_SIGNAL: u8 = 0;
const INTERRUPT: u8 = 1;
const TERMINATE: u8 = 2;

/// Set once by the signal handler thread
static LAST_SIGNAL: AtomicU8 = AtomicU8::new(NO_SIGNAL);

/// Control messages broadcast by the signal handler to processing components
#[derive(Debug, Clone)]
pub enum Ctrl {
    Shutdown,
}

fn record_shutdown(signal: ShutdownSignal) {
    let code = match signal {
        ShutdownSignal::Interrupt => INTERRUPT,
        ShutdownSignal::Terminate => TERMINATE,
    };
    LAST_SIGNAL.store(code, Ordering::Relaxed);
}

/// Signal handler for graceful shutdown
///
/// The first SIGINT/SIGTERM is forwarded as [`Ctrl::Shutdown`] so the input
/// reader can stop; a second one exits immediately. SIGPIPE exits quietly.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    pub fn new(ctrl_sender: Sender<Ctrl>) -> Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGPIPE, SIGTERM])?;

            let handle = thread::Builder::new()
                .name("topids-signals".to_string())
                .spawn(move || {
                    let mut shutdown_count = 0;
                    for sig in signals.forever() {
                        let signal = match sig {
                            SIGINT => ShutdownSignal::Interrupt,
                            SIGTERM => ShutdownSignal::Terminate,
                            // Broken pipe - exit quietly (normal for Unix pipes)
                            SIGPIPE => ExitCode::SignalPipe.exit(),
                            _ => continue,
                        };

                        record_shutdown(signal);
                        shutdown_count += 1;
                        if shutdown_count > 1 {
                            signal.exit_code().exit();
                        }
                        let _ = ctrl_sender.send(Ctrl::Shutdown);
                    }
                })?;

            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            let term_flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&term_flag))?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                loop {
                    thread::sleep(std::time::Duration::from_millis(100));
                    if term_flag.swap(false, Ordering::Relaxed) {
                        record_shutdown(ShutdownSignal::Interrupt);
                        shutdown_count += 1;
                        if shutdown_count > 1 {
                            ExitCode::SignalInt.exit();
                        }
                        let _ = ctrl_sender.send(Ctrl::Shutdown);
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }
    }

    /// The signal that requested shutdown, if any
    pub fn received() -> Option<ShutdownSignal> {
        match LAST_SIGNAL.load(Ordering::Relaxed) {
            INTERRUPT => Some(ShutdownSignal::Interrupt),
            TERMINATE => Some(ShutdownSignal::Terminate),
            _ => None,
        }
    }
}

/// Cross-platform broken pipe detection
fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
    #[cfg(windows)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
    }
}

/// Safe wrapper for writing to stdout that handles broken pipes and other I/O errors
pub struct SafeStdout {
    stdout: io::Stdout,
}

impl SafeStdout {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    /// Write a line to stdout, exiting quietly on a broken pipe
    pub fn writeln(&mut self, data: &str) -> Result<()> {
        match writeln!(self.stdout, "{}", data) {
            Ok(()) => Ok(()),
            Err(e) if is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            Err(e) => Err(anyhow::anyhow!("Failed to write to stdout: {}", e)),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self.stdout.flush() {
            Ok(()) => Ok(()),
            Err(e) if is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            Err(e) => Err(anyhow::anyhow!("Failed to flush stdout: {}", e)),
        }
    }
}

/// Safe wrapper for writing to stderr
pub struct SafeStderr {
    stderr: io::Stderr,
}

impl SafeStderr {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }

    pub fn writeln(&mut self, data: &str) -> Result<()> {
        if writeln!(self.stderr, "{}", data).is_err() {
            // Nowhere left to report to
            ExitCode::GeneralError.exit();
        }
        Ok(())
    }
}

impl Write for SafeStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stderr.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}
