pub mod ref_store;

pub use ref_store::{Ref, RefMap, RefVec};
