//! In-place form submission for structured pages.
//!
//! A [`FormInterceptor`] attaches to every submit control of a [`Page`]. A
//! click POSTs the enclosing form's fields to its action on a worker thread,
//! suppresses the native navigation, and writes the response into the form's
//! output slot once the page drains its event loop.

pub mod cli;
pub mod dom;
pub mod error;
pub mod form;
pub mod http;
pub mod interceptor;
pub mod page;
pub mod render;
pub mod trace;

pub use dom::dom_model::{NodeId, PageDocument};
pub use http::outcome::RequestOutcome;
pub use interceptor::interceptor::FormInterceptor;
pub use page::page::Page;
