//! The dispatch table a compiled router tree is registered into.

use std::fmt;

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::error::{Result, RouterError};
use crate::handler::{BoxHandler, Handler};
use crate::path::PathPattern;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;
use crate::sink::DispatchSink;

/// One registered pattern.
struct MuxRoute {
    /// Pattern as registered, method token included.
    pattern: String,
    /// `None` matches every method.
    method: Option<Method>,
    path: PathPattern,
    handler: BoxHandler,
}

impl MuxRoute {
    /// How well this route's method serves `method`: 2 for an exact match,
    /// 1 for `GET` answering `HEAD`, 0 for a method-less route.
    fn method_rank(&self, method: Method) -> Option<u8> {
        match self.method {
            None => Some(0),
            Some(m) if m == method => Some(2),
            Some(Method::Get) if method == Method::Head => Some(1),
            Some(_) => None,
        }
    }
}

/// Outcome of a lookup.
enum Match<'a> {
    Found(&'a MuxRoute, PathParams),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// A flat, immutable-after-build table of `[METHOD ]PATH` patterns.
///
/// Patterns are a method token, a single space and a path, or just a path
/// (which then matches every method). Paths use the [`PathPattern`] syntax.
/// A `GET` pattern also serves `HEAD`.
///
/// Lookup picks the most specific route whose path and method both match,
/// whatever the registration order. Paths are compared segment by segment:
/// a literal beats a `{param}`, which beats a `{*wildcard}`. Between equally
/// specific paths an exact method beats `GET` serving `HEAD`, which beats a
/// method-less route. When some path matched but no method did, the table
/// answers 405 with an `Allow` header; otherwise 404.
///
/// ```
/// use oxide_subrouter::{handler_fn, Method, Response, ServeMux};
///
/// let mut mux = ServeMux::new();
/// mux.insert("GET /users/{id}", handler_fn(|_req| async { Response::ok() }))
///     .unwrap();
///
/// let (pattern, params) = mux.lookup(Method::Get, "/users/7").unwrap();
/// assert_eq!(pattern, "GET /users/{id}");
/// assert_eq!(params.get("id"), Some("7"));
/// ```
#[derive(Default)]
pub struct ServeMux {
    routes: Vec<MuxRoute>,
}

impl ServeMux {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `pattern`.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidPattern`] for an unknown method token or a bad
    /// path, [`RouterError::DuplicatePattern`] when a route with the same
    /// method and path shape already exists.
    pub fn insert(&mut self, pattern: &str, handler: BoxHandler) -> Result<()> {
        let (method, path) = match pattern.split_once(' ') {
            Some((token, path)) => {
                let method = Method::parse(token).ok_or_else(|| {
                    RouterError::invalid(pattern, format!("unknown method {token:?}"))
                })?;
                (Some(method), path)
            }
            None => (None, pattern),
        };
        if path.is_empty() {
            return Err(RouterError::invalid(pattern, "empty path"));
        }

        let path = PathPattern::new(path).map_err(|e| match e {
            RouterError::InvalidPattern { reason, .. } => RouterError::invalid(pattern, reason),
            other => other,
        })?;

        let shape = path.shape();
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.path.shape() == shape)
        {
            return Err(RouterError::DuplicatePattern(pattern.to_string()));
        }

        trace!(pattern, "Inserted route");
        self.routes.push(MuxRoute {
            pattern: pattern.to_string(),
            method,
            path,
            handler,
        });
        Ok(())
    }

    /// Registered patterns, in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolves a method and path to the pattern that would serve it.
    ///
    /// # Errors
    ///
    /// [`RouterError::MethodNotAllowed`] if only the path matched,
    /// [`RouterError::NotFound`] if nothing did.
    pub fn lookup(&self, method: Method, path: &str) -> Result<(&str, PathParams)> {
        match self.find(method, path) {
            Match::Found(route, params) => Ok((route.pattern.as_str(), params)),
            Match::MethodNotAllowed(_) => Err(RouterError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            }),
            Match::NotFound => Err(RouterError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Serves a request.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            match self.find(request.method, &request.path) {
                Match::Found(route, params) => {
                    request.params = params;
                    route.handler.call(request).await
                }
                Match::MethodNotAllowed(allowed) => {
                    debug!(method = %request.method, path = %request.path, "Method not allowed");
                    let allow = allowed
                        .iter()
                        .map(Method::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    Response::method_not_allowed().header("Allow", allow)
                }
                Match::NotFound => {
                    debug!(method = %request.method, path = %request.path, "No route matched");
                    Response::not_found()
                }
            }
        })
    }

    fn find(&self, method: Method, path: &str) -> Match<'_> {
        let mut best: Option<((Vec<u8>, u8), &MuxRoute, PathParams)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.path.match_path(path) else {
                continue;
            };
            let Some(method_rank) = route.method_rank(method) else {
                if let Some(m) = route.method {
                    push_unique(&mut allowed, m);
                    if m == Method::Get {
                        push_unique(&mut allowed, Method::Head);
                    }
                }
                continue;
            };

            let rank = (route.path.specificity(), method_rank);
            // ties keep the earlier registration
            if best.as_ref().is_none_or(|(top, _, _)| rank > *top) {
                best = Some((rank, route, params));
            }
        }

        match best {
            Some((_, route, params)) => Match::Found(route, params),
            None if allowed.is_empty() => Match::NotFound,
            None => Match::MethodNotAllowed(allowed),
        }
    }
}

fn push_unique(methods: &mut Vec<Method>, method: Method) {
    if !methods.contains(&method) {
        methods.push(method);
    }
}

impl DispatchSink for ServeMux {
    type Error = RouterError;

    fn register(&mut self, pattern: &str, handler: BoxHandler) -> Result<()> {
        self.insert(pattern, handler)
    }
}

impl fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeMux")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .finish()
    }
}
