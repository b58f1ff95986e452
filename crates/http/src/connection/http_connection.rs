use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Response, SendError};

use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

/// An HTTP connection serving exactly one request.
///
/// `HttpConnection` handles the full lifecycle of a single exchange:
/// - Reading and decoding the request
/// - Answering `400 Bad Request` when the request can't be parsed
/// - Handing a parsed request to the [`Handler`]
/// - Framing the body with `Content-Length` and writing the response
/// - Closing the write side, whatever happened before
///
/// There is no keep-alive: bytes following the first request are ignored.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
///
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Reads one request, answers it and closes the connection.
    ///
    /// Returns the parse error when the request was rejected, or the send
    /// error when the response couldn't be written. Neither is retried.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let result = match self.framed_read.next().await {
            Some(Ok(request)) => {
                debug!(method = %request.method(), path = request.path(), "receive request");
                let response = handler.call(request).await;
                self.send_response(response).await.map_err(HttpError::from)
            }

            Some(Err(e)) => self.reject(e).await,

            None => self.reject(ParseError::unexpected_eof()).await,
        };

        self.close().await;
        result
    }

    async fn reject(&mut self, e: ParseError) -> Result<(), HttpError> {
        warn!(cause = %e, "can't parse request, reply bad request");

        let mut response = Response::new();
        response.set_status(StatusCode::BAD_REQUEST);
        if let Err(send_error) = self.send_response(response).await {
            warn!(cause = %send_error, "failed to send bad request response");
        }

        Err(e.into())
    }

    async fn send_response(&mut self, mut response: Response) -> Result<(), SendError> {
        response.set_content_length();
        // `send` flushes the underlying IO as well
        self.framed_write.send(response).await
    }

    async fn close(&mut self) {
        if let Err(e) = self.framed_write.get_mut().shutdown().await {
            warn!(cause = %e, "failed to shutdown connection");
        }
    }
}
