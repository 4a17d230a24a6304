//! Core abstractions for appsecrets: the secret source contract and the
//! well-known application secret bundle.

pub mod app;
pub mod source;
