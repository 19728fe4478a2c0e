//! error system used around the crate.
use std::{error, fmt, io, num, str};

#[derive(Debug, PartialEq)]
pub enum ParseErr {
    Utf8(str::Utf8Error),
    Int(num::ParseIntError),
    StatusErr,
    HeadersErr,
    UriErr,
    Empty,
}

impl error::Error for ParseErr {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use self::ParseErr::*;

        match self {
            Utf8(e) => Some(e),
            Int(e) => Some(e),
            StatusErr | HeadersErr | UriErr | Empty => None,
        }
    }
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ParseErr::*;

        let err = match self {
            Utf8(_) => "Invalid character",
            Int(_) => "Cannot parse number",
            Empty => "Nothing to parse",
            StatusErr => "Status line contains invalid values",
            HeadersErr => "Headers contain invalid values",
            UriErr => "URI contains invalid characters",
        };
        write!(f, "Parse error: {}", err)
    }
}

impl From<num::ParseIntError> for ParseErr {
    fn from(e: num::ParseIntError) -> Self {
        ParseErr::Int(e)
    }
}

impl From<str::Utf8Error> for ParseErr {
    fn from(e: str::Utf8Error) -> Self {
        ParseErr::Utf8(e)
    }
}

/// Failure of a request: anything that kept the client from getting a
/// complete response back.
#[derive(Debug)]
pub enum RequestError {
    Io(io::Error),
    Parse(ParseErr),
    Tls(String),
    TooManyRedirects(usize),
}

impl error::Error for RequestError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use self::RequestError::*;

        match self {
            Io(e) => Some(e),
            Parse(e) => Some(e),
            Tls(_) | TooManyRedirects(_) => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::RequestError::*;

        match self {
            Io(e) => e.fmt(f),
            Parse(e) => e.fmt(f),
            Tls(msg) => write!(f, "TLS error: {}", msg),
            TooManyRedirects(max) => write!(f, "Exceeded {} redirects.", max),
        }
    }
}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        RequestError::Io(e)
    }
}

impl From<ParseErr> for RequestError {
    fn from(e: ParseErr) -> Self {
        RequestError::Parse(e)
    }
}

impl From<str::Utf8Error> for RequestError {
    fn from(e: str::Utf8Error) -> Self {
        RequestError::Parse(ParseErr::Utf8(e))
    }
}

#[cfg(feature = "native-tls")]
impl From<native_tls::Error> for RequestError {
    fn from(e: native_tls::Error) -> Self {
        RequestError::Tls(e.to_string())
    }
}

#[cfg(feature = "native-tls")]
impl<T> From<native_tls::HandshakeError<T>> for RequestError {
    fn from(e: native_tls::HandshakeError<T>) -> Self {
        match e {
            native_tls::HandshakeError::Failure(e) => RequestError::Tls(e.to_string()),
            native_tls::HandshakeError::WouldBlock(_) => {
                RequestError::Tls("handshake interrupted".to_string())
            }
        }
    }
}

#[cfg(all(feature = "rust-tls", not(feature = "native-tls")))]
impl From<rustls::Error> for RequestError {
    fn from(e: rustls::Error) -> Self {
        RequestError::Tls(e.to_string())
    }
}
