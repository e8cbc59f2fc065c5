//! Router trees and their compilation into a dispatch table.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::handler::{handler_fn, BoxHandler};
use crate::middleware::{compose, Middleware};
use crate::mux::ServeMux;
use crate::prefix::{apply_prefix_to_pattern, join_path};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::sink::DispatchSink;

/// A node in a router tree.
///
/// A router holds its own routes, its own middleware and any number of
/// child routers. Each child is attached under a path prefix; the prefix
/// belongs to the attachment, not to the child, so the same kind of router
/// can be built once and mounted anywhere.
///
/// Nothing is resolved while the tree is being built. [`Router::compile`]
/// walks it once and produces a flat [`ServeMux`] in which every route
/// carries its full path and is wrapped by every middleware between the
/// root and its own node, root first.
///
/// # Example
///
/// ```
/// use oxide_subrouter::{middleware_fn, Method, Next, Request, Response, Router};
///
/// let mut root = Router::new();
/// root.use_middleware(middleware_fn(|req: Request, next: Next| async move {
///     next.run(req).await.header("X-Request-Seen", "1")
/// }));
///
/// let api = root.nest("/api");
/// api.get("/users", |_req| async { Response::text("users") });
///
/// let mux = root.compile().unwrap();
/// assert_eq!(mux.patterns().collect::<Vec<_>>(), ["GET /api/users"]);
/// assert!(mux.lookup(Method::Get, "/api/users").is_ok());
/// ```
#[derive(Default)]
pub struct Router {
    /// Own routes, pattern relative to this node.
    routes: Vec<(String, BoxHandler)>,
    /// Own middleware, in registration order.
    middleware: Vec<Arc<dyn Middleware>>,
    /// Children, each under its edge prefix.
    children: Vec<(String, Self)>,
}

impl Router {
    /// Creates an empty root router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty child router under `prefix` and returns it.
    ///
    /// `prefix` may be empty, in which case the child only adds middleware
    /// scoping. Leading and trailing slashes are normalized at compile time.
    pub fn nest(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.mount(prefix, Self::new());
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// Attaches an already built router under `prefix`.
    pub fn mount(&mut self, prefix: impl Into<String>, child: Self) -> &mut Self {
        self.children.push((prefix.into(), child));
        self
    }

    /// Registers a handler for a pattern.
    ///
    /// The pattern is passed to the dispatch table after prefixing, so it
    /// uses that table's syntax: an optional method token and one space,
    /// then a path (`"GET /users/{id}"`, `"/health"`).
    pub fn handle(&mut self, pattern: impl Into<String>, handler: BoxHandler) -> &mut Self {
        self.routes.push((pattern.into(), handler));
        self
    }

    /// Registers an async function or closure for a pattern.
    pub fn handle_fn<F, Fut>(&mut self, pattern: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handle(pattern, handler_fn(handler))
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Get, path, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Post, path, handler)
    }

    /// Adds a PUT route.
    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Put, path, handler)
    }

    /// Adds a PATCH route.
    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Patch, path, handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Delete, path, handler)
    }

    fn method_route<F, Fut>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handle_fn(format!("{method} {path}"), handler)
    }

    /// Adds middleware to this router.
    ///
    /// It wraps every route of this router and of all its descendants.
    /// Middleware added earlier runs outside middleware added later, and a
    /// parent's middleware always runs outside its children's.
    pub fn use_middleware(&mut self, mw: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(mw));
        self
    }

    /// Number of routes in this router and all its descendants.
    pub fn route_count(&self) -> usize {
        self.routes.len()
            + self
                .children
                .iter()
                .map(|(_, child)| child.route_count())
                .sum::<usize>()
    }

    /// Flattens the tree into a new [`ServeMux`].
    ///
    /// # Errors
    ///
    /// Returns the first error the dispatch table raises for a compiled
    /// pattern (invalid syntax or a conflicting registration).
    pub fn compile(self) -> Result<ServeMux> {
        let mut mux = ServeMux::new();
        self.register_into(&mut mux)?;
        Ok(mux)
    }

    /// Flattens the tree into any dispatch sink.
    ///
    /// Routes are registered depth-first: a node's own routes in
    /// registration order, then each child in the order it was attached.
    /// Returns the number of routes registered.
    ///
    /// # Errors
    ///
    /// Stops at, and returns unchanged, the first error from `sink`.
    pub fn register_into<S>(self, sink: &mut S) -> std::result::Result<usize, S::Error>
    where
        S: DispatchSink + ?Sized,
    {
        let count = self.register_node(sink, "", &[], 0)?;
        info!(routes = count, "Compiled router tree");
        Ok(count)
    }

    /// Registers this node's routes and then its children's.
    ///
    /// `prefix` and `chain` are the effective prefix and middleware chain
    /// of this node, its own middleware not yet included.
    fn register_node<S>(
        &self,
        sink: &mut S,
        prefix: &str,
        chain: &[Arc<dyn Middleware>],
        depth: usize,
    ) -> std::result::Result<usize, S::Error>
    where
        S: DispatchSink + ?Sized,
    {
        let chain: Vec<Arc<dyn Middleware>> =
            chain.iter().chain(&self.middleware).cloned().collect();

        for (pattern, handler) in &self.routes {
            let pattern = apply_prefix_to_pattern(prefix, pattern);
            debug!(%pattern, depth, middleware = chain.len(), "Registering route");
            sink.register(&pattern, compose(&chain, Arc::clone(handler)))?;
        }

        let mut count = self.routes.len();
        for (child_prefix, child) in &self.children {
            let prefix = join_path(prefix, child_prefix);
            count += child.register_node(sink, &prefix, &chain, depth + 1)?;
        }
        Ok(count)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .field("middleware", &self.middleware.len())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::error::RouterError;
    use crate::handler::Handler;

    async fn ok_handler(_req: Request) -> Response {
        Response::ok()
    }

    fn compiled_patterns(router: Router) -> Vec<String> {
        let mut sink: Vec<(String, BoxHandler)> = Vec::new();
        router.register_into(&mut sink).unwrap();
        sink.into_iter().map(|(p, _)| p).collect()
    }

    #[test]
    fn test_empty_tree_registers_nothing() {
        let mux = Router::new().compile().unwrap();
        assert!(mux.is_empty());
    }

    #[test]
    fn test_nested_prefixes() {
        let mut root = Router::new();
        root.get("/", ok_handler);
        let api = root.nest("/api");
        api.get("/status", ok_handler);
        api.nest("v1/").post("/users", ok_handler);
        root.nest("").handle_fn("/plain", ok_handler);

        assert_eq!(
            compiled_patterns(root),
            vec!["GET /", "GET /api/status", "POST /api/v1/users", "/plain"]
        );
    }

    #[test]
    fn test_mount_prebuilt_router() {
        let mut admin = Router::new();
        admin.delete("/users/{id}", ok_handler);

        let mut root = Router::new();
        root.mount("/admin", admin).get("/", ok_handler);

        assert_eq!(
            compiled_patterns(root),
            vec!["GET /", "DELETE /admin/users/{id}"]
        );
    }

    #[test]
    fn test_route_count() {
        let mut root = Router::new();
        root.get("/a", ok_handler);
        root.nest("/x").get("/b", ok_handler).put("/c", ok_handler);
        root.nest("/y").nest("/z").patch("/d", ok_handler);
        assert_eq!(root.route_count(), 4);
    }

    #[test]
    fn test_compile_propagates_duplicate() {
        let mut root = Router::new();
        root.get("/api/users", ok_handler);
        root.nest("/api").get("/users/", ok_handler);

        assert_eq!(
            root.compile().unwrap_err(),
            RouterError::DuplicatePattern("GET /api/users".to_string())
        );
    }

    #[test]
    fn test_compile_propagates_invalid_pattern() {
        let mut root = Router::new();
        root.nest("/api").handle_fn("FETCH /users", ok_handler);

        assert!(matches!(
            root.compile(),
            Err(RouterError::InvalidPattern { pattern, .. }) if pattern == "FETCH /api/users"
        ));
    }

    #[test]
    fn test_sink_error_stops_compilation() {
        struct FailAfter(usize, Vec<String>);

        impl DispatchSink for FailAfter {
            type Error = String;

            fn register(
                &mut self,
                pattern: &str,
                _handler: BoxHandler,
            ) -> std::result::Result<(), String> {
                if self.1.len() == self.0 {
                    return Err(format!("rejected {pattern}"));
                }
                self.1.push(pattern.to_string());
                Ok(())
            }
        }

        let mut root = Router::new();
        root.get("/a", ok_handler).get("/b", ok_handler).get("/c", ok_handler);

        let mut sink = FailAfter(2, Vec::new());
        assert_eq!(root.register_into(&mut sink), Err("rejected GET /c".to_string()));
        assert_eq!(sink.1, vec!["GET /a", "GET /b"]);
    }

    #[tokio::test]
    async fn test_middleware_applied_to_own_routes() {
        let mut root = Router::new();
        root.use_middleware(|next: BoxHandler| -> BoxHandler {
            handler_fn(move |req: Request| {
                let fut = next.call(req);
                async move { fut.await.header("X-Root", "1") }
            })
        });
        root.get("/", ok_handler);

        let mut sink: Vec<(String, BoxHandler)> = Vec::new();
        let count: std::result::Result<usize, Infallible> = root.register_into(&mut sink);
        assert_eq!(count, Ok(1));

        let res = sink[0].1.call(Request::get("/")).await;
        assert_eq!(res.get_header("x-root"), Some("1"));
    }

    #[test]
    fn test_debug_lists_structure() {
        let mut root = Router::new();
        root.get("/a", ok_handler);
        root.nest("/b");
        let dbg = format!("{root:?}");
        assert!(dbg.contains("GET /a"));
        assert!(dbg.contains("\"/b\""));
    }
}
