pub mod canonical;
pub mod error;
pub mod json;
pub mod state;
pub mod value;

pub use canonical::{CanonicalDigest, TraceDigest, canonicalize, digest, trace_digest};
pub use error::{Error, Result};
pub use state::State;
pub use value::Value;
