//! parsing server response
use crate::{
    chunked,
    error::{ParseErr, RequestError},
};
use log::trace;
use std::{
    fmt,
    io::{BufRead, Read},
};
use unicase::Ascii;

const MAX_HEAD_LENGTH: usize = 64 * 1024;

///Server's response: status, headers and the whole (decoded) body.
#[derive(Debug, PartialEq)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    ///Reads a complete response from `reader`: the head, then the body framed
    ///by `Transfer-Encoding`/`Content-Length`, or everything until the peer closes.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Response, RequestError> {
        let (status, headers) = loop {
            let head = read_head(reader)?;
            let (status, headers) = Self::parse_head(&head)?;
            trace!("response head: {} {:?}", status.code, headers);

            // interim 1xx heads precede the real one; 101 switches protocols and is final
            if !status.code.is_info() || u16::from(status.code) == 101 {
                break (status, headers);
            }
        };

        let mut body = Vec::new();

        if status.code.has_body() {
            if headers.is_chunked() {
                chunked::Reader::new(reader).read_to_end(&mut body)?;
            } else if let Some(len) = headers.content_len()? {
                reader.by_ref().take(len as u64).read_to_end(&mut body)?;
            } else {
                reader.read_to_end(&mut body)?;
            }
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }

    ///Parses head of a `Response` - status and headers - from slice of bytes.
    ///Bytes are taken as ISO-8859-1, so obs-text in header values never fails the parse.
    pub fn parse_head(head: &[u8]) -> Result<(Status, Headers), ParseErr> {
        let head: String = head.iter().map(|&b| char::from(b)).collect();
        let mut lines = head.lines().filter(|line| !line.is_empty());

        let status = match lines.next() {
            Some(line) => Self::parse_status_line(line)?,
            None => return Err(ParseErr::Empty),
        };
        let headers = Self::parse_headers(lines)?;

        Ok((status, headers))
    }

    ///Parses status line, e.g. `HTTP/1.1 200 OK`. The reason phrase may be missing.
    pub fn parse_status_line(status_line: &str) -> Result<Status, ParseErr> {
        let mut parts = status_line.trim_end().splitn(3, ' ');

        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") {
            return Err(ParseErr::StatusErr);
        }

        let code = parts.next().ok_or(ParseErr::StatusErr)?;
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseErr::StatusErr);
        }
        let code: u16 = code.parse()?;
        let reason = parts.next().unwrap_or("");

        Ok(Status::from((version, code, reason)))
    }

    ///Parses header lines in the order they were sent.
    pub fn parse_headers<'a, I>(lines: I) -> Result<Headers, ParseErr>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut headers = Headers::new();

        for line in lines {
            let (key, value) = line.split_once(':').ok_or(ParseErr::HeadersErr)?;
            let key = key.trim();

            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(ParseErr::HeadersErr);
            }

            headers.insert(key, value.trim());
        }

        Ok(headers)
    }

    ///Returns status code of this `Response`.
    pub fn status_code(&self) -> StatusCode {
        self.status.code
    }

    ///Returns HTTP version of this `Response`.
    pub fn version(&self) -> &str {
        &self.status.version
    }

    ///Returns reason of this `Response`.
    pub fn reason(&self) -> &str {
        &self.status.reason
    }

    ///Returns headers of this `Response`.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    ///Returns raw body of this `Response`.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    ///Returns body as text. Invalid UTF-8 sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

///Reads bytes up to and including the empty line closing the head.
fn read_head<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, RequestError> {
    let mut head = Vec::with_capacity(512);

    loop {
        let start = head.len();
        let limit = (MAX_HEAD_LENGTH + 1 - head.len()) as u64;
        let read = reader.by_ref().take(limit).read_until(b'\n', &mut head)?;

        if read == 0 {
            if head.is_empty() {
                return Err(ParseErr::Empty.into());
            }
            return Err(ParseErr::HeadersErr.into());
        }

        let line = &head[start..];
        if line == b"\r\n" || line == b"\n" {
            return Ok(head);
        }

        if head.len() > MAX_HEAD_LENGTH {
            return Err(ParseErr::HeadersErr.into());
        }
    }
}

///Ordered collection of response headers with case-insensitive names.
///
///Repeated fields are folded into the first one, values joined with `", "`.
///# Example
///```
///use sitemap_probe::response::Headers;
///
///let mut headers = Headers::new();
///headers.insert("Vary", "Accept");
///headers.insert("vary", "RSC");
///
///assert_eq!(headers.get("VARY"), Some(&"Accept, RSC".to_string()));
///assert_eq!(headers.len(), 1);
///```
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Headers(Vec<(Ascii<String>, String)>);

impl Headers {
    ///Creates an empty `Headers`.
    pub fn new() -> Headers {
        Headers(Vec::new())
    }

    ///Returns the value for `key`, matched case-insensitively.
    pub fn get<T: AsRef<str> + ?Sized>(&self, key: &T) -> Option<&String> {
        let key = Ascii::new(key.as_ref());

        self.0
            .iter()
            .find(|(k, _)| Ascii::new(k.as_str()) == key)
            .map(|(_, v)| v)
    }

    ///Adds a header, or appends to the value of an existing one.
    pub fn insert<T, U>(&mut self, key: &T, val: &U)
    where
        T: ToString + ?Sized,
        U: ToString + ?Sized,
    {
        let key = Ascii::new(key.to_string());
        let val = val.to_string();

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&val);
            }
            None => self.0.push((key, val)),
        }
    }

    ///Iterates over `(name, value)` pairs in arrival order, names as sent.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    ///Returns length of the content according to `Content-Length`, if present.
    pub fn content_len(&self) -> Result<Option<usize>, ParseErr> {
        match self.get("Content-Length") {
            // duplicates were folded into "n, n"
            Some(v) => Ok(Some(v.split(',').next().unwrap_or("").trim().parse::<usize>()?)),
            None => Ok(None),
        }
    }

    ///Checks if the last transfer coding is `chunked`.
    pub fn is_chunked(&self) -> bool {
        match self.get("Transfer-Encoding") {
            Some(v) => v
                .rsplit(',')
                .next()
                .map(|c| c.trim().eq_ignore_ascii_case("chunked"))
                .unwrap_or(false),
            None => false,
        }
    }
}

///Code sent by a server in response to a client's request.
///# Example
///```
///use sitemap_probe::response::StatusCode;
///
///let code = StatusCode::from(200);
///assert!(code.is_success())
///```
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StatusCode(u16);

impl StatusCode {
    pub fn new(code: u16) -> StatusCode {
        StatusCode(code)
    }

    ///Checks if this `StatusCode` is within 100-199, which indicates that it's Informational.
    pub fn is_info(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    ///Checks if this `StatusCode` is within 200-299, which indicates that it's Successful.
    pub fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    ///Checks if this `StatusCode` is within 300-399, which indicates that it's Redirection.
    pub fn is_redirect(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    ///Checks if this `StatusCode` is within 400-499, which indicates that it's Client Error.
    pub fn is_client_err(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    ///Checks if this `StatusCode` is within 500-599, which indicates that it's Server Error.
    pub fn is_server_err(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    ///Checks if a response with this code may carry a body.
    pub fn has_body(&self) -> bool {
        !(self.is_info() || self.0 == 204 || self.0 == 304)
    }

    ///Checks if a client should follow the `Location` of a response with this code.
    pub fn is_followed_redirect(&self) -> bool {
        matches!(self.0, 301 | 302 | 303 | 307 | 308)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(PartialEq, Debug)]
pub struct Status {
    version: String,
    code: StatusCode,
    reason: String,
}

impl<T, U, V> From<(T, U, V)> for Status
where
    T: ToString,
    V: ToString,
    StatusCode: From<U>,
{
    fn from(status: (T, U, V)) -> Status {
        Status {
            version: status.0.to_string(),
            code: StatusCode::from(status.1),
            reason: status.2.to_string(),
        }
    }
}
