use std::time::Duration;

use reqwest::StatusCode;

use crate::models::InferenceRequest;

/// Raw reply from the serving host; nothing about the body is trusted yet.
#[derive(Debug)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Handle on the inference backend. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    address: String,
}

impl BackendClient {
    pub fn new(address: String, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// One POST, no retries. Errors here are transport-level only; HTTP
    /// failure statuses come back as a normal reply.
    pub async fn classify(&self, body: &InferenceRequest) -> reqwest::Result<BackendReply> {
        let resp = self.client.post(&self.address).json(body).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        Ok(BackendReply {
            status,
            body: body.to_vec(),
        })
    }
}
