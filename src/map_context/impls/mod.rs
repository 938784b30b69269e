mod field_writes;
mod foundation_access;
mod random;

pub use field_writes::{ClimateWrite, HeightfieldWrite};
pub use random::{RngState, random_label};
