//! Response Recorder
//!
//! Body adapter that copies every data frame into a buffer while passing it
//! through to the client untouched.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use futures::FutureExt;
use http_body::{Body, Frame, SizeHint};

type OnComplete = Box<dyn FnOnce(Bytes) -> BoxFuture<'static, ()> + Send>;

// == Response Recorder ==
/// Tees a response body into an in-memory buffer.
///
/// Frames reach the client in the order and shape the inner body produced
/// them. Once the inner body ends, the completion hook (if any) runs with the
/// full recorded body and end-of-stream is reported only after it finishes.
/// If the inner body fails, or the recorder is dropped early, the hook never
/// runs.
pub struct ResponseRecorder<B> {
    inner: B,
    buffer: BytesMut,
    on_complete: Option<OnComplete>,
    completing: Option<BoxFuture<'static, ()>>,
    finished: bool,
}

impl<B> ResponseRecorder<B> {
    // == Constructor ==
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            on_complete: None,
            completing: None,
            finished: false,
        }
    }

    /// Sets the hook that receives the recorded body after the last frame.
    pub fn on_complete<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce(Bytes) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_complete = Some(Box::new(move |body| hook(body).boxed()));
        self
    }

    /// Bytes recorded so far.
    pub fn recorded(&self) -> &[u8] {
        &self.buffer
    }

    /// True once the inner body has ended and the hook has completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<B> fmt::Debug for ResponseRecorder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRecorder")
            .field("recorded", &self.buffer.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<B> Body for ResponseRecorder<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(completing) = this.completing.as_mut() {
                ready!(completing.poll_unpin(cx));
                this.completing = None;
                this.finished = true;
                continue;
            }

            return match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
                Some(Ok(frame)) => {
                    if let Some(data) = frame.data_ref() {
                        this.buffer.extend_from_slice(data);
                    }
                    Poll::Ready(Some(Ok(frame)))
                }
                Some(Err(err)) => {
                    this.on_complete = None;
                    Poll::Ready(Some(Err(err)))
                }
                None => match this.on_complete.take() {
                    Some(hook) => {
                        this.completing = Some(hook(this.buffer.clone().freeze()));
                        continue;
                    }
                    None => {
                        this.finished = true;
                        Poll::Ready(None)
                    }
                },
            };
        }
    }

    // The inner size hint is withheld so the body is always polled to its end
    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body as AxumBody;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    fn chunked(chunks: &[&'static str]) -> AxumBody {
        let chunks: Vec<Result<Bytes, Infallible>> = chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect();
        AxumBody::from_stream(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_records_chunks_in_order() {
        let captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let recorder = ResponseRecorder::new(chunked(&["ab", "cd"])).on_complete(move |body| async move {
            *sink.lock().unwrap() = Some(body);
        });

        let delivered = axum::body::to_bytes(AxumBody::new(recorder), usize::MAX)
            .await
            .unwrap();

        assert_eq!(delivered, Bytes::from_static(b"abcd"));
        assert_eq!(captured.lock().unwrap().clone(), Some(Bytes::from_static(b"abcd")));
    }

    #[tokio::test]
    async fn test_frames_pass_through_unchanged() {
        let mut recorder = ResponseRecorder::new(chunked(&["ab", "cd"]));

        let first = std::future::poll_fn(|cx| Pin::new(&mut recorder).poll_frame(cx))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.into_data().unwrap(), Bytes::from_static(b"ab"));
        assert_eq!(recorder.recorded(), b"ab");

        let second = std::future::poll_fn(|cx| Pin::new(&mut recorder).poll_frame(cx))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.into_data().unwrap(), Bytes::from_static(b"cd"));
        assert_eq!(recorder.recorded(), b"abcd");

        let end = std::future::poll_fn(|cx| Pin::new(&mut recorder).poll_frame(cx)).await;
        assert!(end.is_none());
        assert!(recorder.is_finished());
    }

    #[tokio::test]
    async fn test_end_of_stream_waits_for_hook() {
        let (release, released) = tokio::sync::oneshot::channel::<()>();
        let recorder = ResponseRecorder::new(chunked(&["x"])).on_complete(move |_| async move {
            let _ = released.await;
        });

        let reading = tokio::spawn(axum::body::to_bytes(AxumBody::new(recorder), usize::MAX));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!reading.is_finished());

        release.send(()).unwrap();
        let delivered = reading.await.unwrap().unwrap();
        assert_eq!(delivered, Bytes::from_static(b"x"));
    }

    #[tokio::test]
    async fn test_empty_body_records_nothing() {
        let captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let recorder = ResponseRecorder::new(AxumBody::empty()).on_complete(move |body| async move {
            *sink.lock().unwrap() = Some(body);
        });

        let delivered = axum::body::to_bytes(AxumBody::new(recorder), usize::MAX)
            .await
            .unwrap();

        assert!(delivered.is_empty());
        assert_eq!(captured.lock().unwrap().clone(), Some(Bytes::new()));
    }

    #[tokio::test]
    async fn test_dropped_recorder_skips_hook() {
        let captured = Arc::new(Mutex::new(None::<Bytes>));
        let sink = captured.clone();

        let recorder = ResponseRecorder::new(chunked(&["ab", "cd"])).on_complete(move |body| async move {
            *sink.lock().unwrap() = Some(body);
        });
        drop(recorder);

        assert!(captured.lock().unwrap().is_none());
    }
}
