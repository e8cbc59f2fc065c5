//! Registration targets for compiled routes.

use std::convert::Infallible;

use crate::handler::BoxHandler;

/// A dispatch table that accepts fully-qualified routes.
///
/// [`Router::register_into`](crate::Router::register_into) calls
/// [`register`](Self::register) once per route in the tree. Pattern
/// validation and conflict detection belong to the sink; the first error
/// it returns stops compilation and is handed back to the caller as-is.
pub trait DispatchSink {
    /// Error raised for a rejected pattern.
    type Error;

    /// Adds one route.
    fn register(&mut self, pattern: &str, handler: BoxHandler) -> Result<(), Self::Error>;
}

/// Collects routes in registration order without validating them.
impl DispatchSink for Vec<(String, BoxHandler)> {
    type Error = Infallible;

    fn register(&mut self, pattern: &str, handler: BoxHandler) -> Result<(), Self::Error> {
        self.push((pattern.to_string(), handler));
        Ok(())
    }
}

impl<S: DispatchSink + ?Sized> DispatchSink for &mut S {
    type Error = S::Error;

    fn register(&mut self, pattern: &str, handler: BoxHandler) -> Result<(), Self::Error> {
        (**self).register(pattern, handler)
    }
}
