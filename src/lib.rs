//!Sitemap probe: fetches one resource over HTTP(S) and reports what came back.
//!
//!The HTTP client is a small blocking one: a single connection per request,
//!TLS through `native-tls` (default) or `rustls`, redirects followed.
//!
//!## Example
//!```no_run
//!use sitemap_probe::{report, request};
//!
//!let outcome = request::fetch();
//!report::write_report(&mut std::io::stdout(), &outcome).unwrap();
//!```
pub mod chunked;
pub mod error;
pub mod report;
pub mod request;
pub mod response;
pub mod stream;
pub mod tls;
pub mod uri;
