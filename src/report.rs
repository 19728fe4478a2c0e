//! plain-text report of a fetch outcome
use crate::{error::RequestError, response::Response};
use std::io::{self, Write};

/// Characters of the body shown under `Content Preview:`.
pub const PREVIEW_CHARS: usize = 200;

///Writes the report for `outcome` to `out`.
///
///A response, whatever its status code, gets the full report: status code,
///headers in arrival order, then a preview of the body. A failed request gets
///a single `Error: ...` line.
pub fn write_report<W: Write>(
    out: &mut W,
    outcome: &Result<Response, RequestError>,
) -> io::Result<()> {
    match outcome {
        Ok(res) => write_response(out, res),
        Err(e) => writeln!(out, "Error: {}", e),
    }
}

fn write_response<W: Write>(out: &mut W, res: &Response) -> io::Result<()> {
    writeln!(out, "Status Code: {}", res.status_code())?;
    writeln!(out, "Headers:")?;

    for (name, value) in res.headers().iter() {
        writeln!(out, "{}: {}", name, value)?;
    }

    writeln!(out)?;
    writeln!(out, "Content Preview:")?;
    writeln!(out, "{}", preview(&res.text(), PREVIEW_CHARS))
}

///Returns the first `max_chars` characters of `text`, or all of it if shorter.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
