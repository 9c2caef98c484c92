// Chunked NDJSON streaming utilities
use crate::domain::dashboard::DashboardEvent;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::Stream;

/// Create a chunked NDJSON streaming response: one JSON object per line,
/// flushed as each event arrives.
pub fn ndjson_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = DashboardEvent> + Send + 'static,
{
    let byte_stream = stream.map(|event| encode_line(&event));
    let body = Body::from_stream(byte_stream);

    // NOTE: No Content-Encoding here. Compressing the stream would let
    // middleware buffer chunks, defeating progressive delivery.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn encode_line(event: &DashboardEvent) -> Result<Bytes, std::io::Error> {
    let mut line = serde_json::to_vec(event).map_err(std::io::Error::other)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<DashboardEvent>,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield event;
        }
    };

    match ndjson_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::CompletionSummary;

    #[test]
    fn test_encode_line_terminates_each_event_with_newline() {
        let event = DashboardEvent::Complete(CompletionSummary {
            panels: 2,
            duration_ms: 42,
        });

        let bytes = encode_line(&event).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["event"], "complete");
        assert_eq!(value["panels"], 2);
    }
}
