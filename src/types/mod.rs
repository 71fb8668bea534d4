//! Core types shared by the client, the stream consumer and the loop.

pub mod event;
pub mod request;

pub use event::*;
pub use request::*;
