//! Re-exports of crates that appear in the public API.

pub use async_trait;
pub use serde_json;
pub use time;
