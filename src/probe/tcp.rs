//! TCP probe (C2): attempts a connect to `(host, port)` bounded by `tcpTimeout`. Any of
//! connect error, timeout, or host-unresolvable is treated alike as "unavailable" — this
//! probe never returns an error, only a bool.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

pub async fn connect(host: &str, port: u16, tcp_timeout: Duration) -> bool {
    let addr = format!("{host}:{port}");

    let resolved = match tokio::net::lookup_host(&addr).await {
        Ok(mut addrs) => addrs.next(),
        Err(e) => {
            debug!(%addr, error = %e, "tcp probe: dns resolution failed");
            None
        }
    };

    let Some(sockaddr) = resolved else {
        return false;
    };

    match timeout(tcp_timeout, TcpStream::connect(sockaddr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "tcp probe: connect failed");
            false
        }
        Err(_) => {
            debug!(%addr, "tcp probe: connect timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_a_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });
        let ok = connect("127.0.0.1", port, Duration::from_millis(500)).await;
        assert!(ok);
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        // Port 0 never accepts connections once bound-and-dropped; pick an address that
        // is very unlikely to have a listener.
        let ok = connect("127.0.0.1", 1, Duration::from_millis(200)).await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn unresolvable_host_is_unavailable() {
        let ok = connect(
            "this-host-does-not-resolve.invalid",
            80,
            Duration::from_millis(200),
        )
        .await;
        assert!(!ok);
    }
}
