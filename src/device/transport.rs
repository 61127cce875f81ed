use std::io::Read;

use crate::errors::Result;

/// One in-flight response: the numeric status plus a readable body.
/// Dropping the body closes the underlying connection, so every exit path
/// of a download releases the transport.
pub struct TransportResponse<B> {
    status: u16,
    body: B,
}

impl<B: Read> TransportResponse<B> {
    pub fn new(status: u16, body: B) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn into_body(self) -> B {
        self.body
    }
}

/// Seam for the network stack on the device side.
pub trait Transport {
    type Body: Read;

    fn get(&mut self, url: &str) -> Result<TransportResponse<Self::Body>>;
}

/// Blocking HTTP transport. The device loop has exactly one job, so
/// blocking socket reads on its only thread are acceptable.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: reqwest::blocking::Client::new() }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    type Body = reqwest::blocking::Response;

    fn get(&mut self, url: &str) -> Result<TransportResponse<Self::Body>> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        Ok(TransportResponse::new(status, response))
    }
}
