//! Unix domain socket probe (C2): a bare connect attempt, closed immediately on success.

use std::path::Path;

use tracing::debug;

#[cfg(unix)]
pub async fn connect(path: &Path) -> bool {
    match tokio::net::UnixStream::connect(path).await {
        Ok(stream) => {
            drop(stream);
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "socket probe: connect failed");
            false
        }
    }
}

#[cfg(not(unix))]
pub async fn connect(_path: &Path) -> bool {
    debug!("socket probe: unix domain sockets are unavailable on this platform");
    false
}
