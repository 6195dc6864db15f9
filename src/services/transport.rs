// src/services/transport.rs
use std::future::Future;

use futures::{StreamExt, stream::BoxStream};
use reqwest::Client;
use tracing::debug;

use crate::{
    config::ChatConfig,
    error::{ChatError, ChatResult},
    message::StreamRequest,
};

/// Response body as raw chunks, in arrival order.
pub type BodyStream = BoxStream<'static, ChatResult<Vec<u8>>>;

/// Opens a response stream for one exchange.
pub trait Transport {
    fn open(&self, request: &StreamRequest) -> impl Future<Output = ChatResult<BodyStream>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, endpoint: config.endpoint.clone() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> ChatResult<BodyStream> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Connection(format!("server answered {status}")));
        }
        debug!(%status, endpoint = %self.endpoint, "response stream opened");

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ChatError::Stream(e.to_string()))
            })
            .boxed();
        Ok(body)
    }
}
