use std::convert::Infallible;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::event::StreamEvent;

/// Content type of the event stream.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Create a streaming NDJSON response from a stream of events.
///
/// Each event becomes one JSON line. Dropping the response body (client
/// disconnect) drops the stream, which the bridge observes as cancellation.
pub fn ndjson_response<S>(stream: S) -> Response
where
    S: Stream<Item = StreamEvent> + Send + 'static,
{
    let body = stream.filter_map(|event| async move {
        match event.to_ndjson() {
            Ok(line) => Some(Ok::<_, Infallible>(Bytes::from(line))),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unserializable stream event");
                None
            }
        }
    });

    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}
