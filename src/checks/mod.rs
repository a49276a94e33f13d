//! Bundled check adapters for common dependencies.
//!
//! Every adapter implements [`Check`](crate::Check); anything not covered
//! here can be plugged in through [`check_fn`](crate::check_fn) or
//! [`fallible`](crate::fallible).

pub mod tcp;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "redis")]
pub mod redis;
