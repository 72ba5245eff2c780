//! Subprocess-backed decoder.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::bridge::{parse_reply_bytes, request_line, DecoderReply, StreamDecoder};
use crate::config::DecoderConfig;
use crate::error::{CoreError, CoreResult};
use crate::format::escape_bytes;
use crate::record::RawRecord;

/// Interval between exit status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One raw line read from the decoder; `None` at end of output.
type ReplyLine = io::Result<Option<Vec<u8>>>;

/// A decoder running as a child process.
///
/// The process is started on the first [`StreamDecoder::decode`] call and
/// serves every following record. It is stopped by
/// [`StreamDecoder::shutdown`], after any fatal exchange error, and when the
/// decoder is dropped.
pub struct ProcessDecoder {
    config: DecoderConfig,
    session: Option<Session>,
}

impl ProcessDecoder {
    /// Creates a decoder for `config`. Nothing is started yet.
    #[must_use]
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            config: config.clone(),
            session: None,
        }
    }

    /// Whether the child process is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// OS process id of the running child.
    #[must_use]
    pub fn child_id(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.child.id())
    }
}

impl StreamDecoder for ProcessDecoder {
    fn decode(&mut self, record: &RawRecord) -> CoreResult<DecoderReply> {
        if self.session.is_none() {
            self.session = Some(Session::spawn(&self.config)?);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(CoreError::DecoderExited {
                program: self.config.program.clone(),
                status: "not running".to_string(),
            });
        };

        let result = session.exchange(&self.config, record);
        if result.is_err() {
            // Dropping the session kills and reaps the child.
            self.session = None;
        }
        result
    }

    fn shutdown(&mut self) -> CoreResult<()> {
        match self.session.take() {
            Some(session) => session.close(&self.config),
            None => Ok(()),
        }
    }
}

impl Drop for ProcessDecoder {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Stopping external decoder {:?} on drop", self.config.program);
            drop(session);
        }
    }
}

/// A running child with its reply channel.
struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: Receiver<ReplyLine>,
    reader: Option<JoinHandle<()>>,
}

impl Session {
    fn spawn(config: &DecoderConfig) -> CoreResult<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CoreError::DecoderSpawn {
                program: config.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let Some(stdout) = child.stdout.take() else {
            child.kill().ok();
            child.wait().ok();
            return Err(CoreError::DecoderIo {
                program: config.program.clone(),
                source: io::Error::new(io::ErrorKind::Other, "decoder output not captured"),
            });
        };

        let (tx, replies) = mpsc::channel();
        let reader = thread::spawn(move || read_replies(stdout, &tx));

        info!(
            "Started external decoder {:?} (pid {})",
            config.program,
            child.id()
        );

        Ok(Self {
            child,
            stdin,
            replies,
            reader: Some(reader),
        })
    }

    fn exchange(&mut self, config: &DecoderConfig, record: &RawRecord) -> CoreResult<DecoderReply> {
        let line = request_line(record);
        let written = match self.stdin.as_mut() {
            Some(stdin) => stdin
                .write_all(line.as_bytes())
                .and_then(|()| stdin.flush()),
            None => Err(io::Error::from(io::ErrorKind::BrokenPipe)),
        };
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Err(self.exited(config)),
            Err(source) => {
                return Err(CoreError::DecoderIo {
                    program: config.program.clone(),
                    source,
                })
            }
        }

        let received = match config.timeout {
            Some(timeout) => match self.replies.recv_timeout(timeout) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CoreError::DecoderTimeout {
                        program: config.program.clone(),
                        index: record.index,
                        timeout,
                    })
                }
                Err(RecvTimeoutError::Disconnected) => Ok(None),
            },
            None => self.replies.recv().unwrap_or(Ok(None)),
        };

        match received {
            Ok(Some(line)) => {
                let reply = parse_reply_bytes(&line, record.index);
                if let DecoderReply::Malformed { reason, raw } = &reply {
                    warn!(
                        "Entry {}: malformed reply from external decoder ({}): {}",
                        record.index,
                        reason,
                        escape_bytes(raw)
                    );
                }
                Ok(reply)
            }
            Ok(None) => Err(self.exited(config)),
            Err(source) => Err(CoreError::DecoderIo {
                program: config.program.clone(),
                source,
            }),
        }
    }

    /// Builds the error for a decoder that stopped serving requests.
    fn exited(&mut self, config: &DecoderConfig) -> CoreError {
        let status = match self.wait_for_exit(config.shutdown_grace) {
            Ok(Some(status)) => status.to_string(),
            Ok(None) => "output closed, process still running".to_string(),
            Err(e) => format!("exit status unavailable: {e}"),
        };
        CoreError::DecoderExited {
            program: config.program.clone(),
            status,
        }
    }

    /// Polls for the child's exit for at most `grace`.
    fn wait_for_exit(&mut self, grace: Duration) -> io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + grace;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Drains the reply channel until end of output, for at most `grace`.
    fn output_closed(&self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(left) {
                Ok(Ok(Some(line))) => {
                    debug!("Discarding unrequested decoder output: {}", escape_bytes(&line));
                }
                Ok(Ok(None) | Err(_)) | Err(RecvTimeoutError::Disconnected) => return true,
                Err(RecvTimeoutError::Timeout) => return false,
            }
        }
    }

    /// Closes the decoder's input and reaps it, killing it after the grace
    /// period.
    fn close(mut self, config: &DecoderConfig) -> CoreResult<()> {
        drop(self.stdin.take());
        let io_err = |source| CoreError::DecoderIo {
            program: config.program.clone(),
            source,
        };

        let status = match self.wait_for_exit(config.shutdown_grace).map_err(io_err)? {
            Some(status) => status,
            None => {
                debug!(
                    "External decoder {:?} still running after {:?}, killing it",
                    config.program, config.shutdown_grace
                );
                self.child.kill().ok();
                self.child.wait().map_err(io_err)?
            }
        };

        // A grandchild may still hold the decoder's output open.
        if let Some(reader) = self.reader.take() {
            if self.output_closed(config.shutdown_grace) {
                reader.join().ok();
            } else {
                debug!(
                    "Output of external decoder {:?} still open after exit, detaching reader",
                    config.program
                );
            }
        }

        if status.success() {
            debug!("External decoder {:?} exited", config.program);
        } else {
            warn!("External decoder {:?} exited with {}", config.program, status);
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if matches!(self.child.try_wait(), Ok(None)) {
            self.child.kill().ok();
        }
        self.child.wait().ok();
    }
}

/// Forwards reply lines until end of output or until the receiver is gone.
fn read_replies(stdout: ChildStdout, tx: &Sender<ReplyLine>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let message = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                tx.send(Ok(None)).ok();
                return;
            }
            Ok(_) => Ok(Some(buf.clone())),
            Err(e) => Err(e),
        };
        let failed = message.is_err();
        if tx.send(message).is_err() || failed {
            return;
        }
    }
}
