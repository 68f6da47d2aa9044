pub mod traits;
pub mod wrappers;

pub use traits::*;
