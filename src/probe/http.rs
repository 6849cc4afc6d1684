//! HTTP(S) probe (C2): issues one request with the resource's method (HEAD unless the
//! resource kind is `*Get`). TLS materials, proxy, basic auth, and custom headers are all
//! baked into the shared `reqwest::Client` once at startup (`build_client`); only the
//! per-request `httpTimeout` and the method vary per probe.
//!
//! `http(s)://unix:<sockPath>:<urlPath>` resources can't be expressed as a `reqwest::Client`
//! request (no Unix-domain transport there), so those are driven by a minimal hand-rolled
//! HTTP/1.1 exchange straight over a `UnixStream`, parsed with `httparse`.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Method};
#[cfg(unix)]
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use crate::config::Options;
use crate::error::WaitOnError;

/// Builds the single `reqwest::Client` shared by every HTTP(S) probe this run. TLS, proxy,
/// and redirect policy are client-wide settings in `reqwest`, so they're resolved once here
/// rather than per-request.
pub fn build_client(opts: &Options) -> Result<Client, WaitOnError> {
    let mut builder = Client::builder()
        .danger_accept_invalid_certs(!opts.strict_ssl)
        .redirect(if opts.follow_redirect {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if let Some(http_timeout) = opts.http_timeout {
        builder = builder.timeout(http_timeout);
    }

    if let Some(ca_path) = &opts.ca {
        let pem = std::fs::read(ca_path)?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| WaitOnError::ConfigInvalid(format!("invalid CA certificate: {e}")))?;
        builder = builder.add_root_certificate(cert);
    }

    if let (Some(cert_path), Some(key_path)) = (&opts.cert, &opts.key) {
        let mut pem = std::fs::read(cert_path)?;
        pem.extend(std::fs::read(key_path)?);
        let identity = reqwest::Identity::from_pem(&pem)
            .map_err(|e| WaitOnError::ConfigInvalid(format!("invalid client certificate/key: {e}")))?;
        builder = builder.identity(identity);
    }

    if let Some(proxy) = &opts.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| WaitOnError::ConfigInvalid(format!("invalid proxy url: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| WaitOnError::Fatal(format!("failed to build http client: {e}")))
}

/// Probes a plain `http(s)://` URL.
pub async fn probe(client: &Client, url: &str, method: Method, opts: &Options) -> bool {
    let mut request = client.request(method, url);

    if let Some(http_timeout) = opts.http_timeout {
        request = request.timeout(http_timeout);
    }
    if let Some(auth) = &opts.auth {
        request = request.basic_auth(&auth.username, auth.password.as_deref());
    }
    for (name, value) in &opts.headers {
        request = request.header(name, value);
    }

    match request.send().await {
        Ok(response) => (opts.validate_status)(response.status().as_u16()),
        Err(e) => {
            debug!(%url, error = %e, "http probe: request failed");
            false
        }
    }
}

/// Probes an `http(s)://unix:<sockPath>:<urlPath>` resource with a bare HTTP/1.1 exchange
/// over a `UnixStream`. No connection pooling, no redirects, no TLS — this mirrors what the
/// equivalent plain TCP probe above does, just over a different transport.
#[cfg(unix)]
pub async fn probe_unix(socket_path: &Path, url_path: &str, method: Method, opts: &Options) -> bool {
    let connect_timeout = opts.http_timeout.unwrap_or(Duration::from_secs(5));

    let mut stream = match timeout(
        connect_timeout,
        tokio::net::UnixStream::connect(socket_path),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            debug!(path = %socket_path.display(), error = %e, "http-over-unix probe: connect failed");
            return false;
        }
        Err(_) => {
            debug!(path = %socket_path.display(), "http-over-unix probe: connect timed out");
            return false;
        }
    };

    let request = format!(
        "{method} {url_path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    );

    let exchange = async {
        stream.write_all(request.as_bytes()).await?;

        let mut buf = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 64 * 1024 {
                break;
            }
        }
        Ok::<_, std::io::Error>(buf)
    };

    let buf = match timeout(connect_timeout, exchange).await {
        Ok(Ok(buf)) => buf,
        Ok(Err(e)) => {
            debug!(path = %socket_path.display(), error = %e, "http-over-unix probe: io error");
            return false;
        }
        Err(_) => {
            debug!(path = %socket_path.display(), "http-over-unix probe: response timed out");
            return false;
        }
    };

    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut response = httparse::Response::new(&mut headers);
    match response.parse(&buf) {
        Ok(_) => match response.code {
            Some(code) => (opts.validate_status)(code),
            None => false,
        },
        Err(e) => {
            debug!(path = %socket_path.display(), error = %e, "http-over-unix probe: malformed response");
            false
        }
    }
}

#[cfg(not(unix))]
pub async fn probe_unix(socket_path: &Path, _url_path: &str, _method: Method, _opts: &Options) -> bool {
    debug!(
        path = %socket_path.display(),
        "http-over-unix probe: unix domain sockets are unavailable on this platform"
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn http_over_unix_parses_status_line() {
        use tokio::io::AsyncWriteExt as _;
        use tokio::net::UnixListener;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wait-on-http.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
                    .await;
            }
        });

        let opts = crate::config::validate(crate::config::RawOptions {
            resources: Some(vec!["file:/tmp".to_string()]),
            ..Default::default()
        })
        .unwrap();

        let ok = probe_unix(&path, "/health", Method::HEAD, &opts).await;
        assert!(ok);
    }
}
