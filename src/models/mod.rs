//! Data models for the Lignage family tree application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod datastore;
mod member;
mod title;
mod tree;

pub use datastore::*;
pub use member::*;
pub use title::*;
pub use tree::*;
