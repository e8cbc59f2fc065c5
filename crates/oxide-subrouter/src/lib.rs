//! # oxide-subrouter
//!
//! Nested routers with scoped middleware, flattened into a single dispatch
//! table.
//!
//! This crate provides:
//! - A [`Router`] tree: each node has its own routes, its own middleware and
//!   child routers attached under a path prefix
//! - A compiler that flattens the tree into `(pattern, handler)` pairs with
//!   the full prefix applied and the full middleware chain wrapped around
//!   each handler
//! - [`ServeMux`], a flat dispatch table for `"[METHOD ]/path/{param}"`
//!   patterns that the compiled routes are registered into
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_subrouter::{middleware_fn, Next, Request, Response, Router};
//!
//! let mut root = Router::new();
//! root.use_middleware(middleware_fn(log_requests));
//!
//! let api = root.nest("/api");
//! api.use_middleware(middleware_fn(require_token));
//! api.get("/users", list_users);
//! api.get("/users/{id}", get_user);
//!
//! let mux = root.compile()?;
//! let response = mux.handle(Request::get("/api/users/42")).await;
//! ```
//!
//! `GET /api/users/42` runs `log_requests`, then `require_token`, then
//! `get_user`, and the response travels back out in reverse order.
//!
//! ## Prefixes
//!
//! Prefixes are joined like paths: `"/api/"` + `"/users"` is `/api/users`,
//! and a prefix of `"/"` or `""` adds nothing. A leading method token
//! survives prefixing: `"POST /users"` under `/api` becomes
//! `"POST /api/users"`. See [`apply_prefix_to_pattern`].
//!
//! ## Middleware
//!
//! A middleware is anything implementing [`Middleware`]: a transform from
//! the inner handler to an outer one. For each route the chain is every
//! ancestor's middleware (root first, registration order) followed by the
//! route's own router's middleware; the first entry is the outermost layer.
//! Middleware registered on one child never reaches its siblings or its
//! parent.
//!
//! ## Other dispatch tables
//!
//! [`Router::register_into`] accepts any [`DispatchSink`], so the compiled
//! routes can be fed into a different matcher, or into a plain `Vec` for
//! inspection.

mod error;
mod handler;
mod middleware;
mod mux;
mod path;
mod prefix;
mod request;
mod response;
mod router;
mod sink;

pub use error::{Result, RouterError};
pub use handler::{handler_fn, BoxHandler, Handler};
pub use middleware::{compose, middleware_fn, Middleware, Next};
pub use mux::ServeMux;
pub use path::{PathPattern, PathSegment};
pub use prefix::{apply_prefix_to_pattern, join_path};
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::Router;
pub use sink::DispatchSink;
