//! Request handlers.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::request::Request;
use crate::response::Response;

/// Anything that can turn a [`Request`] into a [`Response`].
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Response>`,
/// so plain async functions and closures are handlers.
pub trait Handler: Send + Sync {
    /// Handles one request.
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        self(req).boxed()
    }
}

/// A shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Boxes an async function or closure into a [`BoxHandler`].
///
/// ```
/// use oxide_subrouter::{handler_fn, Response};
///
/// let health = handler_fn(|_req| async { Response::text("ok") });
/// # let _ = health;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> BoxHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_path(req: Request) -> Response {
        Response::text(req.path)
    }

    #[tokio::test]
    async fn test_async_fn_is_handler() {
        let handler = handler_fn(echo_path);
        let res = handler.call(Request::get("/echo")).await;
        assert_eq!(res.body_string(), Some("/echo".to_string()));
    }

    #[tokio::test]
    async fn test_closure_captures_state() {
        let greeting = String::from("hello");
        let handler = handler_fn(move |_req| {
            let greeting = greeting.clone();
            async move { Response::text(greeting) }
        });

        let shared = Arc::clone(&handler);
        assert_eq!(
            shared.call(Request::get("/")).await.body_string(),
            Some("hello".to_string())
        );
    }
}
