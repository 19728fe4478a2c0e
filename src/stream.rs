//! TCP stream
use crate::{error::RequestError, tls, tls::Conn, uri::Uri};
use log::debug;
use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpStream},
};

/// Wrapper around TCP stream for HTTP and HTTPS protocols.
#[derive(Debug)]
pub enum Stream {
    Http(TcpStream),
    Https(Conn<TcpStream>),
}

impl Stream {
    /// Opens a TCP connection to the host of `uri`, using OS default timeouts.
    pub fn connect(uri: &Uri) -> Result<Stream, RequestError> {
        let host = uri.host_name();
        let port = uri.corr_port();

        let stream = TcpStream::connect((host, port))?;
        debug!("connected to {}:{} ({:?})", host, port, stream.peer_addr().ok());

        Ok(Stream::Http(stream))
    }

    /// Tries to establish a secure connection over TLS.
    ///
    /// Checks if `uri` scheme denotes a HTTPS protocol:
    /// - If yes, attemps to establish a secure connection
    /// - Otherwise, returns the `stream` without any modification
    pub fn try_to_https(stream: Stream, uri: &Uri) -> Result<Stream, RequestError> {
        match stream {
            Stream::Http(http_stream) => {
                if uri.scheme() == "https" {
                    let host = uri.host_name();
                    let stream = tls::Config::default().connect(host, http_stream)?;
                    debug!("TLS session established with {}", host);

                    Ok(Stream::Https(stream))
                } else {
                    Ok(Stream::Http(http_stream))
                }
            }
            Stream::Https(_) => Ok(stream),
        }
    }

    /// Returns the address of the remote peer.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Stream::Http(stream) => stream.peer_addr(),
            Stream::Https(conn) => conn.get_ref().peer_addr(),
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        match self {
            Stream::Http(stream) => stream.read(buf),
            Stream::Https(stream) => stream.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        match self {
            Stream::Http(stream) => stream.write(buf),
            Stream::Https(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        match self {
            Stream::Http(stream) => stream.flush(),
            Stream::Https(stream) => stream.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connect_plain_http() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let uri: Uri = format!("http://{}/", addr).parse().unwrap();

        let stream = Stream::connect(&uri).unwrap();
        let stream = Stream::try_to_https(stream, &uri).unwrap();

        assert!(matches!(stream, Stream::Http(_)));
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn connect_ipv6_literal() {
        let listener = match TcpListener::bind("[::1]:0") {
            Ok(listener) => listener,
            // host without IPv6 loopback
            Err(_) => return,
        };
        let addr = listener.local_addr().unwrap();
        let uri: Uri = format!("http://[::1]:{}/", addr.port()).parse().unwrap();

        let stream = Stream::connect(&uri).unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn connect_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let uri: Uri = format!("http://{}/", addr).parse().unwrap();

        match Stream::connect(&uri) {
            Err(RequestError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused),
            other => panic!("expected connection refused, got {:?}", other),
        }
    }
}
