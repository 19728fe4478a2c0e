#![feature(test)]
extern crate test;

use sitemap_probe::{response::Response, uri::Uri};
use test::Bencher;

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Accept-Ranges: bytes\r\n\
    Access-Control-Allow-Origin: *\r\n\
    Age: 5204\r\n\
    Cache-Control: public, max-age=0, must-revalidate\r\n\
    Content-Type: application/xml\r\n\
    Server: Vercel\r\n\
    Strict-Transport-Security: max-age=63072000\r\n\
    X-Vercel-Cache: HIT\r\n\
    Content-Length: 120\r\n\r\n\
    <?xml version=\"1.0\" encoding=\"UTF-8\"?>\
    <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"><url><loc>/</loc></url></urlset>";

#[bench]
fn read_response(b: &mut Bencher) {
    b.iter(|| {
        let mut reader = RESPONSE;
        Response::read_from(&mut reader)
    });
}

#[bench]
fn parse_uri(b: &mut Bencher) {
    const URI: &str = "https://yousef-bakr-s-portfolio.vercel.app/sitemap.xml";

    b.iter(|| URI.parse::<Uri>());
}
