//! TCP Server
//!
//! Accepts connections one at a time and serves each to completion.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Connection;
use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

/// TCP server for LineKV
///
/// While a connection is being served the listener is not polled, so later
/// clients wait in the kernel backlog until the current one disconnects.
pub struct Server {
    config: Config,
    store: Arc<Store>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.listen_addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            store,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is bound to (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that can stop `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr,
        }
    }

    /// Start the server (blocking)
    ///
    /// Per-connection errors are logged and never stop the accept loop.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr);

        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    if self.shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            tracing::info!("Client connected from {}", peer);
            match self.serve(stream) {
                Ok(()) => tracing::info!("Client {} disconnected", peer),
                Err(e) => tracing::info!("Client {} disconnected: {}", peer, e),
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Serve a single accepted stream to completion
    pub fn serve(&self, stream: TcpStream) -> Result<()> {
        let mut conn = Connection::new(stream, Arc::clone(&self.store), self.config.limits())?;
        conn.set_nodelay(self.config.nodelay)?;
        conn.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
        conn.handle()
    }
}

/// Stops a running `Server`
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop after the current connection
    ///
    /// A throwaway connection wakes the blocking `accept`.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
        let _ = TcpStream::connect(self.addr);
    }
}
