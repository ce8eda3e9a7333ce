//! UCI engine process wrapper (async I/O)

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::protocol::EngineCommand;
use crate::session::CommandSink;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Write side of an engine connection. Cheap to clone; sending never blocks.
#[derive(Clone, Debug)]
pub struct EngineSender {
    tx: mpsc::UnboundedSender<String>,
}

impl EngineSender {
    /// A sender with nobody listening. Every send fails with
    /// [`EngineError::ChannelClosed`].
    pub fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }
}

impl CommandSink for EngineSender {
    fn send(&self, cmd: &EngineCommand) -> Result<(), EngineError> {
        self.tx
            .send(cmd.to_string())
            .map_err(|_| EngineError::ChannelClosed)
    }
}

/// An engine that has completed the UCI handshake, with its stdin and stdout
/// pumped by two background tasks.
pub struct EngineConnection {
    sender: EngineSender,
    lines: mpsc::UnboundedReceiver<String>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl EngineConnection {
    /// Run the handshake over `reader`/`writer`, then hand both to the pump tasks.
    pub async fn open<R, W>(reader: R, mut writer: W, config: &EngineConfig) -> Result<Self, EngineError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut reader = BufReader::new(reader);

        tokio::time::timeout(
            config.handshake_timeout,
            handshake(&mut reader, &mut writer, config),
        )
        .await
        .map_err(|_| EngineError::Timeout)??;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (line_tx, line_rx) = mpsc::unbounded_channel();

        Ok(Self {
            sender: EngineSender { tx: cmd_tx },
            lines: line_rx,
            writer: tokio::spawn(pump_commands(writer, cmd_rx)),
            reader: tokio::spawn(pump_lines(reader, line_tx)),
        })
    }

    pub fn sender(&self) -> EngineSender {
        self.sender.clone()
    }

    /// Next line of engine output, or `None` once the engine's stdout is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    fn close(&self) {
        self.writer.abort();
        self.reader.abort();
    }
}

impl Drop for EngineConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// The engine child process together with its connection. Killed on drop.
pub struct EngineHandle {
    process: Child,
    connection: EngineConnection,
}

impl EngineHandle {
    /// Spawn the engine binary and initialise UCI
    pub async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdout not captured".into()))?;

        let connection = EngineConnection::open(stdout, stdin, config).await?;
        info!(path = %config.path, pid = ?process.id(), "Engine ready");

        Ok(Self {
            process,
            connection,
        })
    }

    pub fn sender(&self) -> EngineSender {
        self.connection.sender()
    }

    pub async fn next_line(&mut self) -> Option<String> {
        self.connection.next_line().await
    }

    /// Send `quit` and give the process a moment to exit before killing it.
    /// Returns the exit status once the process has been reaped.
    pub async fn shutdown(mut self) -> Option<ExitStatus> {
        let _ = self.connection.sender.send(&EngineCommand::Quit);
        let status = match tokio::time::timeout(SHUTDOWN_GRACE, self.process.wait()).await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(e)) => {
                warn!("Failed to wait for engine: {e}");
                None
            }
            Err(_) => {
                debug!("Engine ignored quit, killing");
                if let Err(e) = self.process.kill().await {
                    warn!("Failed to kill engine: {e}");
                }
                self.process.try_wait().ok().flatten()
            }
        };
        if let Some(status) = status {
            debug!(%status, "Engine exited");
        }
        self.connection.close();
        status
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

async fn handshake<R, W>(reader: &mut R, writer: &mut W, config: &EngineConfig) -> Result<(), EngineError>
where
    R: AsyncBufReadExt + Unpin,
    W: AsyncWrite + Unpin,
{
    write_line(writer, &EngineCommand::Uci.to_string()).await?;
    wait_for(reader, "uciok").await?;

    let options = [
        ("Threads", config.threads.to_string()),
        ("Hash", config.hash_mb.to_string()),
    ];
    for (name, value) in options {
        let cmd = EngineCommand::SetOption {
            name: name.to_string(),
            value,
        };
        write_line(writer, &cmd.to_string()).await?;
    }

    write_line(writer, &EngineCommand::IsReady.to_string()).await?;
    wait_for(reader, "readyok").await
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, cmd: &str) -> Result<(), EngineError> {
    debug!(cmd, "ENGINE <");
    writer.write_all(format!("{cmd}\n").as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Wait for a specific response line
async fn wait_for<R: AsyncBufReadExt + Unpin>(reader: &mut R, expected: &str) -> Result<(), EngineError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(EngineError::Handshake(format!(
                "engine closed its output before {expected}"
            )));
        }
        let trimmed = line.trim();
        debug!(line = trimmed, "ENGINE >");
        if trimmed == expected {
            return Ok(());
        }
    }
}

async fn pump_commands<W: AsyncWrite + Unpin>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(cmd) = rx.recv().await {
        if let Err(e) = write_line(&mut writer, &cmd).await {
            warn!("Engine stopped accepting commands: {e}");
            break;
        }
    }
}

async fn pump_lines<R: AsyncBufReadExt + Unpin>(reader: R, tx: mpsc::UnboundedSender<String>) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                debug!(line = %line, "ENGINE >");
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => {
                warn!("Engine closed its output");
                break;
            }
            Err(e) => {
                warn!("Failed to read from engine: {e}");
                break;
            }
        }
    }
}
