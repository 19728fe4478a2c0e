//! creating and sending HTTP requests
use crate::{
    error::RequestError,
    response::{Headers, Response},
    stream::Stream,
    uri::Uri,
};
use log::debug;
use std::io::{BufReader, Write};

const CR_LF: &str = "\r\n";
const HTTP_V: &str = "HTTP/1.1";

/// Resource the probe reports on.
pub const TARGET_URL: &str = "https://yousef-bakr-s-portfolio.vercel.app/sitemap.xml";

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 30;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A single GET request with the client's default headers.
#[derive(Clone, Debug, PartialEq)]
pub struct Request<'a> {
    uri: &'a Uri,
    headers: Headers,
}

impl<'a> Request<'a> {
    ///Creates new `Request` with default headers
    pub fn new(uri: &'a Uri) -> Request<'a> {
        let mut headers = Headers::new();
        headers.insert("Host", &uri.host_header());
        headers.insert("User-Agent", USER_AGENT);
        headers.insert("Accept", "*/*");
        headers.insert("Connection", "close");

        Request { uri, headers }
    }

    ///Returns headers this `Request` will send.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    ///Parses request message
    pub fn parse_msg(&self) -> Vec<u8> {
        let request_line = format!("GET {} {}{}", self.uri.resource(), HTTP_V, CR_LF);

        let headers: String = self
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}{}", k, v, CR_LF))
            .collect();

        (request_line + &headers + CR_LF).into_bytes()
    }

    ///Sends this request over `stream` and reads the whole response back.
    pub fn send_over<S>(&self, stream: S) -> Result<Response, RequestError>
    where
        S: std::io::Read + Write,
    {
        let mut stream = stream;
        stream.write_all(&self.parse_msg())?;
        stream.flush()?;

        let mut reader = BufReader::new(stream);
        Response::read_from(&mut reader)
    }

    ///Sends HTTP request.
    ///
    ///Opens a TCP connection (and wraps it with TLS if needed), writes the request
    ///and returns the response. One connection, no retries.
    pub fn send(&self) -> Result<Response, RequestError> {
        let stream = Stream::connect(self.uri)?;
        let stream = Stream::try_to_https(stream, self.uri)?;

        debug!("GET {}", self.uri);
        self.send_over(stream)
    }
}

///Sends a GET request to `uri`, following redirects. Returns the final response,
///whatever its status code.
pub fn get<T: AsRef<str>>(uri: T) -> Result<Response, RequestError> {
    let mut uri: Uri = uri.as_ref().parse()?;
    let mut redirects = 0;

    loop {
        let res = Request::new(&uri).send()?;

        let location = match res.headers().get("Location") {
            Some(loc) if res.status_code().is_followed_redirect() => loc,
            _ => return Ok(res),
        };

        if redirects == MAX_REDIRECTS {
            return Err(RequestError::TooManyRedirects(MAX_REDIRECTS));
        }
        redirects += 1;

        let next = uri.join(location)?;
        debug!("{} redirect #{}: {} -> {}", res.status_code(), redirects, uri, next);
        uri = next;
    }
}

///Fetches the probe's target resource.
pub fn fetch() -> Result<Response, RequestError> {
    get(TARGET_URL)
}
