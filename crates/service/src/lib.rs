//! Backend service abstraction and implementations for the board.
//!
//! This crate provides the trait-based contract the board engine uses to
//! reach the backend, an HTTP implementation, and an in-process
//! implementation used for demos and tests.

#![warn(missing_docs)]

pub mod trait_;
pub mod http;
pub mod memory;

pub use trait_::{BoardService, EvidenceFile, Result, ServiceError};
pub use http::HttpBoardService;
pub use memory::InMemoryBoardService;
