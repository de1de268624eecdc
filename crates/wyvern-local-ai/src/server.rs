//! Launcher for the llama-server process.
//!
//! Launching is fire-and-forget: the server needs time to load its model, and
//! nothing here waits for that. Poll [`LlamaCppClient::probe`] before sending
//! the first request to a freshly launched server.
//!
//! [`LlamaCppClient::probe`]: crate::LlamaCppClient::probe

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::LlamaCppClient;
use crate::error::LocalAIError;
use crate::{DEFAULT_CONTEXT_SIZE, DEFAULT_PORT, DEFAULT_SERVER_BINARY};

/// Command-line parameters for llama-server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Executable to run; looked up on `PATH` when not a path.
    pub executable: PathBuf,
    /// GGUF model file, passed as `-m`.
    pub model_path: PathBuf,
    pub port: u16,
    pub context_size: u32,
    /// Layers to offload to the GPU, passed as `-ngl`.
    pub gpu_layers: u32,
}

impl LaunchOptions {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_SERVER_BINARY),
            model_path: model_path.into(),
            port: DEFAULT_PORT,
            context_size: DEFAULT_CONTEXT_SIZE,
            gpu_layers: 0,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_context_size(mut self, context_size: u32) -> Self {
        self.context_size = context_size;
        self
    }

    pub fn with_gpu_layers(mut self, gpu_layers: u32) -> Self {
        self.gpu_layers = gpu_layers;
        self
    }

    /// Build the command without spawning it.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("--port")
            .arg(self.port.to_string())
            .arg("-c")
            .arg(self.context_size.to_string())
            .arg("-ngl")
            .arg(self.gpu_layers.to_string());
        command
    }
}

/// Spawns llama-server processes.
pub struct LlamaCppServer;

impl LlamaCppServer {
    /// Start llama-server with the given options and return immediately.
    ///
    /// Nothing is checked up front; a missing executable surfaces as
    /// [`LocalAIError::ServerStartFailed`]. A missing model file only shows
    /// up later, when the child exits.
    pub fn launch(options: &LaunchOptions) -> Result<ServerHandle, LocalAIError> {
        info!(
            "Starting {} on port {} with model {}",
            options.executable.display(),
            options.port,
            options.model_path.display()
        );

        let child = options
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                LocalAIError::ServerStartFailed(format!("{}: {}", options.executable.display(), e))
            })?;

        debug!("llama-server process started with PID: {}", child.id());

        Ok(ServerHandle {
            child,
            port: options.port,
        })
    }
}

/// A running llama-server child process.
///
/// The caller owns the process. Dropping the handle leaves the server
/// running; call [`ServerHandle::terminate`] to stop it.
#[derive(Debug)]
pub struct ServerHandle {
    child: Child,
    port: u16,
}

impl ServerHandle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Check if the server process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Block until the process exits.
    pub fn wait(&mut self) -> Result<ExitStatus, LocalAIError> {
        Ok(self.child.wait()?)
    }

    /// Stop the server, gracefully first where the platform allows it.
    pub fn terminate(&mut self) -> Result<(), LocalAIError> {
        info!("Stopping llama-server (PID: {})", self.child.id());

        #[cfg(unix)]
        {
            // SAFETY: the PID belongs to a child we spawned and have not reaped.
            unsafe {
                libc::kill(self.child.id() as i32, libc::SIGTERM);
            }
            std::thread::sleep(Duration::from_millis(500));
        }

        match self.child.try_wait()? {
            Some(status) => {
                debug!("Server exited with status: {:?}", status);
            }
            None => {
                warn!("Server didn't exit gracefully, killing...");
                self.child.kill()?;
                self.child.wait()?;
            }
        }
        Ok(())
    }

    /// Get a client connected to this server.
    pub fn client(&self) -> LlamaCppClient {
        LlamaCppClient::with_port(self.port)
    }
}
