//! quill-core: the data model and state engine behind the quill writing
//! workspace.
//!
//! Works contain chapters, chapters contain scenes, and chapters and
//! scenes both hold ordered blocks of prose or annotated "lens" blocks.
//! Every change goes through [`reducer::reduce`] as an [`action::Action`];
//! [`store::Store`] wraps the reducer with subscribers and snapshot
//! persistence.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per boundary, each mapping to a stable
//!   [`error::ErrorCode`]. The reducer itself never fails.
//! - **Logging**: `tracing` macros. Dispatches log at `debug`, swallowed
//!   persistence failures at `warn`.

pub mod action;
pub mod compile;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod persist;
pub mod reducer;
pub mod search;
pub mod seed;
pub mod store;
pub mod transfer;
pub mod verify;

pub use action::Action;
pub use model::State;
pub use reducer::{reduce, reduce_with};
pub use store::Store;
