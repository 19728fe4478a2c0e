//! secure connection over TLS
use crate::error::RequestError;
use std::io::{self, Read, Write};

#[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
use rustls::{ClientConnection, StreamOwned};
#[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
use rustls_pki_types::ServerName;

#[cfg(not(any(feature = "native-tls", feature = "rust-tls")))]
compile_error!("one of the `native-tls` or `rust-tls` features must be enabled");

/// Wrapper around TLS Stream, depends on selected TLS library:
/// - native_tls: `TlsStream<S>`
/// - rustls: `StreamOwned<ClientConnection, S>`
///
/// `native-tls` takes precedence when both features are enabled.
#[derive(Debug)]
pub struct Conn<S: io::Read + io::Write> {
    #[cfg(feature = "native-tls")]
    stream: native_tls::TlsStream<S>,

    #[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
    stream: StreamOwned<ClientConnection, S>,
}

impl<S> Conn<S>
where
    S: io::Read + io::Write,
{
    /// Returns a reference to the underlying socket.
    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }
}

impl<S> Read for Conn<S>
where
    S: io::Read + io::Write,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let len = self.stream.read(buf);

        #[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
        {
            // servers that drop the socket without close_notify still sent a complete message
            if let Err(ref e) = len {
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionAborted | io::ErrorKind::UnexpectedEof
                ) {
                    return Ok(0);
                }
            }
        }

        len
    }
}

impl<S> Write for Conn<S>
where
    S: io::Read + io::Write,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.stream.flush()
    }
}

/// Client configuration for TLS connection. Uses the platform trust store
/// (native-tls) or the bundled Mozilla roots (rustls).
pub struct Config {
    #[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
    root_certs: std::sync::Arc<rustls::RootCertStore>,
}

impl Default for Config {
    #[cfg(feature = "native-tls")]
    fn default() -> Self {
        Config {}
    }

    #[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
    fn default() -> Self {
        let root_store = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect(),
        };

        Config {
            root_certs: std::sync::Arc::new(root_store),
        }
    }
}

impl Config {
    /// Establishes a secure connection.
    #[cfg(feature = "native-tls")]
    pub fn connect<H, S>(&self, hostname: H, stream: S) -> Result<Conn<S>, RequestError>
    where
        H: AsRef<str>,
        S: io::Read + io::Write,
    {
        let connector = native_tls::TlsConnector::new()?;
        let stream = connector.connect(hostname.as_ref(), stream)?;

        Ok(Conn { stream })
    }

    /// Establishes a secure connection.
    #[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
    pub fn connect<H, S>(&self, hostname: H, stream: S) -> Result<Conn<S>, RequestError>
    where
        H: AsRef<str>,
        S: io::Read + io::Write,
    {
        let hostname = hostname.as_ref().to_string();

        let client_config = rustls::ClientConfig::builder()
            .with_root_certificates(self.root_certs.clone())
            .with_no_client_auth();

        let server_name = ServerName::try_from(hostname.clone())
            .map_err(|_| RequestError::Tls(format!("invalid DNS name: {}", hostname)))?;
        let session = ClientConnection::new(std::sync::Arc::new(client_config), server_name)?;

        Ok(Conn {
            stream: StreamOwned::new(session, stream),
        })
    }
}
