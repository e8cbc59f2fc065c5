#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_subrouter::{
    handler_fn, middleware_fn, BoxHandler, Handler, Middleware, Next, Request, Response, Router,
};

/// Shared execution log written by instrumented middleware and handlers.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    /// Returns the log and clears it.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    /// Middleware that logs `{name}>` on the way in and `<{name}` on the
    /// way out.
    pub fn layer(&self, name: &'static str) -> impl Middleware {
        let trace = self.clone();
        middleware_fn(move |req: Request, next: Next| {
            let trace = trace.clone();
            async move {
                trace.push(format!("{name}>"));
                let res = next.run(req).await;
                trace.push(format!("<{name}"));
                res
            }
        })
    }

    /// Handler that logs `name` and answers with it as the body.
    pub fn handler(&self, name: &'static str) -> BoxHandler {
        let trace = self.clone();
        handler_fn(move |_req| {
            let trace = trace.clone();
            async move {
                trace.push(name);
                Response::text(name)
            }
        })
    }
}

/// Flattens `router` into a `Vec` sink.
pub fn flatten(router: Router) -> Vec<(String, BoxHandler)> {
    let mut sink = Vec::new();
    router
        .register_into(&mut sink)
        .unwrap_or_else(|e| match e {});
    sink
}

/// Patterns of a flattened router, in registration order.
pub fn patterns(router: Router) -> Vec<String> {
    flatten(router).into_iter().map(|(p, _)| p).collect()
}

/// Calls the handler registered under `pattern` and returns the trace.
pub async fn run(
    routes: &[(String, BoxHandler)],
    pattern: &str,
    trace: &Trace,
) -> Vec<String> {
    let (_, handler) = routes
        .iter()
        .find(|(p, _)| p == pattern)
        .unwrap_or_else(|| panic!("no route {pattern:?} in {:?}", names(routes)));
    trace.take();
    handler.call(Request::get("/")).await;
    trace.take()
}

fn names(routes: &[(String, BoxHandler)]) -> Vec<&str> {
    routes.iter().map(|(p, _)| p.as_str()).collect()
}
