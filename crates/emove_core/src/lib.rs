pub mod allocator;
mod models;
pub mod natsort;
pub mod normalize;
mod store;

pub use crate::models::*;
pub use crate::store::{EntityStore, NewStation, StoreError};
