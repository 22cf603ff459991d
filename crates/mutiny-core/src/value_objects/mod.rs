//! Value objects - immutable types defined by their value

mod id;

pub use id::Id;
