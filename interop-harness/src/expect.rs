//! Pattern matching over the line-oriented output of a shape application.
//!
//! A session buffers the lines it has received and, on each `expect` call,
//! searches that buffer for a set of patterns. The earliest match wins;
//! when two patterns match at the same position the lower index wins. Text
//! preceding the match is exposed as `before`, the match itself as `after`,
//! and everything following it stays buffered for the next call.

use std::io::{self, BufRead, BufReader, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use regex::Regex;

/// Upper bound on the diagnostic transcript kept per session.
pub const MAX_TRANSCRIPT_BYTES: usize = 64 * 1024;

/// Already-searched output rescanned when a new line arrives, so a match
/// may start this far back and still be found.
pub const SEARCH_OVERLAP_BYTES: usize = 1024;

/// Result of waiting for a set of patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Index into the pattern slice of the pattern that matched.
    Matched(usize),
    /// No pattern matched before the deadline.
    Timeout,
    /// The output stream closed without a match.
    Eof,
}

/// A stream of output that can be matched against patterns.
pub trait OutputStream: Send {
    /// Wait up to `timeout` for any of `patterns` to appear.
    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Expect;

    /// Text consumed before the most recent match.
    fn before(&self) -> &str;

    /// Text of the most recent match.
    fn after(&self) -> &str;

    /// Output seen so far, truncated to the most recent
    /// [`MAX_TRANSCRIPT_BYTES`].
    fn transcript(&self) -> String;

    /// Stop the underlying producer. Further expects see the remaining
    /// buffered lines and then `Eof`.
    fn terminate(&mut self) {}
}

/// Tail-preserving text buffer.
#[derive(Debug, Default)]
struct Transcript {
    text: String,
}

impl Transcript {
    fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        if self.text.len() > MAX_TRANSCRIPT_BYTES {
            let mut cut = self.text.len() - MAX_TRANSCRIPT_BYTES;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }
}

/// Matcher over lines delivered through a channel.
///
/// The channel closing is end of stream.
#[derive(Debug)]
pub struct LineSession {
    lines: Receiver<String>,
    pending: String,
    before: String,
    after: String,
    transcript: Transcript,
    closed: bool,
}

impl LineSession {
    /// Create a session reading from `lines`.
    pub fn new(lines: Receiver<String>) -> Self {
        Self {
            lines,
            pending: String::new(),
            before: String::new(),
            after: String::new(),
            transcript: Transcript::default(),
            closed: false,
        }
    }

    /// Earliest match starting at or after byte `from` of the pending text.
    fn find_earliest(&self, patterns: &[&Regex], from: usize) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some(m) = pattern.find_at(&self.pending, from) {
                // Strict comparison keeps the lower index on ties.
                if best.map_or(true, |(_, start, _)| m.start() < start) {
                    best = Some((index, m.start(), m.end()));
                }
            }
        }
        best
    }

    /// Where the next search starts once the whole pending text has been
    /// searched without a match.
    fn resume_point(&self) -> usize {
        let mut at = self.pending.len().saturating_sub(SEARCH_OVERLAP_BYTES);
        while !self.pending.is_char_boundary(at) {
            at -= 1;
        }
        at
    }

    fn receive(&mut self, deadline: Option<Instant>) -> Result<(), RecvTimeoutError> {
        let line = match deadline {
            Some(deadline) => self.lines.recv_deadline(deadline)?,
            None => self
                .lines
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected)?,
        };
        self.transcript.push_line(&line);
        self.pending.push_str(&line);
        self.pending.push('\n');
        Ok(())
    }
}

impl OutputStream for LineSession {
    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Expect {
        let deadline = Instant::now().checked_add(timeout);
        // Each call brings a new pattern set, so the first pass covers
        // everything buffered; later passes only the new tail.
        let mut from = 0;
        loop {
            if let Some((index, start, end)) = self.find_earliest(patterns, from) {
                self.before = self.pending[..start].to_string();
                self.after = self.pending[start..end].to_string();
                self.pending.drain(..end);
                return Expect::Matched(index);
            }

            if self.closed {
                self.before = std::mem::take(&mut self.pending);
                self.after.clear();
                return Expect::Eof;
            }

            from = self.resume_point();
            match self.receive(deadline) {
                Ok(()) => {}
                Err(RecvTimeoutError::Timeout) => return Expect::Timeout,
                Err(RecvTimeoutError::Disconnected) => self.closed = true,
            }
        }
    }

    fn before(&self) -> &str {
        &self.before
    }

    fn after(&self) -> &str {
        &self.after
    }

    fn transcript(&self) -> String {
        self.transcript.text.clone()
    }
}

/// How a child's output reaches the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// stdout and stderr share a pseudo-terminal, so stdio in the child
    /// stays line buffered. Falls back to [`Capture::Pipe`] where no
    /// terminal can be opened.
    #[default]
    Terminal,
    /// stdout and stderr are plain pipes. Children that buffer their
    /// output on a pipe only show it at exit.
    Pipe,
}

/// A running child process whose stdout and stderr are matched together.
///
/// On unix the child leads its own process group; [`OutputStream::terminate`]
/// and drop kill the whole group, then reap the child. Wrappers such as
/// `sh` take their descendants down with them.
pub struct ProcessSession {
    session: LineSession,
    child: Option<Child>,
}

impl ProcessSession {
    /// Spawn `command` under a pseudo-terminal, stdin closed.
    pub fn spawn(command: Command) -> io::Result<Self> {
        Self::spawn_with(command, Capture::Terminal)
    }

    /// Spawn `command` with stdin closed and output captured per `capture`.
    pub fn spawn_with(mut command: Command, capture: Capture) -> io::Result<Self> {
        command.stdin(Stdio::null());
        #[cfg(unix)]
        command.process_group(0);

        let (tx, rx) = unbounded();
        let child = match capture {
            Capture::Terminal => match open_terminal() {
                Ok((reader, writer)) => {
                    command
                        .stdout(Stdio::from(writer.try_clone()?))
                        .stderr(Stdio::from(writer));
                    let child = command.spawn()?;
                    // The parent's copies of the terminal end live in
                    // `command`; release them so the reader sees the close.
                    drop(command);
                    forward_lines(reader, tx);
                    child
                }
                Err(_) => spawn_piped(&mut command, tx)?,
            },
            Capture::Pipe => spawn_piped(&mut command, tx)?,
        };

        Ok(Self {
            session: LineSession::new(rx),
            child: Some(child),
        })
    }

    /// OS process id of the child, if it is still owned by the session.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

fn spawn_piped(command: &mut Command, tx: Sender<String>) -> io::Result<Child> {
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx);
    }
    Ok(child)
}

/// Open a pseudo-terminal: the controller end for reading, the terminal
/// end for the child.
///
/// Both ends are close-on-exec so entities spawned concurrently do not
/// inherit each other's terminals; the child gets its end through dup2.
#[cfg(unix)]
fn open_terminal() -> io::Result<(std::fs::File, std::os::fd::OwnedFd)> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};
    use std::os::fd::AsRawFd;

    let pty = nix::pty::openpty(None, None)?;
    for fd in [pty.master.as_raw_fd(), pty.slave.as_raw_fd()] {
        fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((std::fs::File::from(pty.master), pty.slave))
}

#[cfg(not(unix))]
fn open_terminal() -> io::Result<(std::fs::File, std::fs::File)> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "pseudo-terminals need unix",
    ))
}

/// Kill every process in the group `child` leads.
#[cfg(unix)]
fn kill_group(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match i32::try_from(child.id()) {
        // Fails with ESRCH once the whole group is gone.
        Ok(pid) => {
            let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
        }
        Err(_) => {
            let _ = child.kill();
        }
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    let _ = child.kill();
}

/// Forward lines from `stream` on a detached thread.
///
/// Readers are not joined: a grandchild holding the stream open must not
/// block teardown. The thread ends when the stream closes or errors (a
/// terminal reports EIO once every writer is gone) or the session is
/// dropped.
fn forward_lines<R: Read + Send + 'static>(stream: R, tx: Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

impl OutputStream for ProcessSession {
    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Expect {
        self.session.expect(patterns, timeout)
    }

    fn before(&self) -> &str {
        self.session.before()
    }

    fn after(&self) -> &str {
        self.session.after()
    }

    fn transcript(&self) -> String {
        self.session.transcript()
    }

    fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            // The leader is not reaped yet, so its pid still names the group.
            kill_group(&mut child);
            let _ = child.wait();
        }
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// One step of a scripted output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Emit a line.
    Line(String),
    /// Wait before the next step.
    Pause(Duration),
    /// Keep the stream open without output until terminated.
    Hang,
}

impl Step {
    /// Shorthand for [`Step::Line`].
    pub fn line(text: impl Into<String>) -> Self {
        Step::Line(text.into())
    }
}

/// Output stream replaying a fixed script, for tests without processes.
///
/// The script runs on its own thread. When it ends without [`Step::Hang`]
/// the stream closes, which reads as `Eof`.
pub struct ScriptedSession {
    session: LineSession,
    stop: Option<Sender<()>>,
}

impl ScriptedSession {
    /// Start replaying `steps`.
    pub fn new(steps: Vec<Step>) -> Self {
        let (tx, rx) = unbounded();
        let (stop_tx, stop_rx) = unbounded::<()>();

        thread::spawn(move || {
            for step in steps {
                match step {
                    Step::Line(line) => {
                        if tx.send(line).is_err() {
                            return;
                        }
                    }
                    Step::Pause(duration) => match stop_rx.recv_timeout(duration) {
                        Err(RecvTimeoutError::Timeout) => {}
                        _ => return,
                    },
                    Step::Hang => {
                        let _ = stop_rx.recv();
                        return;
                    }
                }
            }
        });

        Self {
            session: LineSession::new(rx),
            stop: Some(stop_tx),
        }
    }

    /// Script that prints `lines` and then closes.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(Step::line).collect())
    }
}

impl OutputStream for ScriptedSession {
    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Expect {
        self.session.expect(patterns, timeout)
    }

    fn before(&self) -> &str {
        self.session.before()
    }

    fn after(&self) -> &str {
        self.session.after()
    }

    fn transcript(&self) -> String {
        self.session.transcript()
    }

    fn terminate(&mut self) {
        self.stop.take();
    }
}
