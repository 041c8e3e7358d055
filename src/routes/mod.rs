//! HTTP surface

pub mod rates;

pub use rates::router;
