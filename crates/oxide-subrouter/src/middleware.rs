//! Middleware: handler-to-handler transforms.

use std::future::Future;
use std::sync::Arc;

use crate::handler::{handler_fn, BoxHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// Wraps a handler in another handler.
///
/// A middleware sees the request before the wrapped handler does and the
/// response after it, so a chain of middleware forms an onion: the first
/// one registered is the outermost layer.
///
/// Any `Fn(BoxHandler) -> BoxHandler` is a middleware. For the common
/// "do something, call the rest, do something else" shape use
/// [`middleware_fn`].
///
/// # Example
///
/// ```
/// use oxide_subrouter::{handler_fn, BoxHandler, Handler, Middleware, Request, Response};
///
/// let powered_by = |next: BoxHandler| -> BoxHandler {
///     handler_fn(move |req: Request| {
///         let fut = next.call(req);
///         async move { fut.await.header("X-Powered-By", "oxide") }
///     })
/// };
/// # let _ = powered_by.wrap(handler_fn(|_req| async { Response::ok() }));
/// ```
pub trait Middleware: Send + Sync {
    /// Returns a handler that runs this middleware around `next`.
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// The rest of the chain, as seen from inside a [`middleware_fn`].
#[derive(Clone)]
pub struct Next {
    inner: BoxHandler,
}

impl Next {
    /// Passes the request on to the next layer and waits for its response.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Builds a middleware from an async function of the request and the rest
/// of the chain.
///
/// Returning without calling [`Next::run`] short-circuits the chain.
///
/// ```
/// use oxide_subrouter::{middleware_fn, Next, Request, Response};
///
/// let require_token = middleware_fn(|req: Request, next: Next| async move {
///     if req.get_header("Authorization").is_none() {
///         return Response::unauthorized();
///     }
///     next.run(req).await
/// });
/// # let _ = require_token;
/// ```
pub fn middleware_fn<F, Fut>(f: F) -> impl Middleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let f = Arc::new(f);
    move |next: BoxHandler| -> BoxHandler {
        let f = Arc::clone(&f);
        handler_fn(move |req: Request| {
            let next = Next {
                inner: Arc::clone(&next),
            };
            (*f)(req, next)
        })
    }
}

/// Applies `chain` to `handler`, first element outermost.
///
/// `[m1, m2, m3]` around `h` yields `m1(m2(m3(h)))`: the request passes
/// `m1 -> m2 -> m3 -> h` and the response comes back `m3 -> m2 -> m1`.
pub fn compose(chain: &[Arc<dyn Middleware>], handler: BoxHandler) -> BoxHandler {
    chain
        .iter()
        .rev()
        .fold(handler, |inner, mw| mw.wrap(inner))
}
