pub mod options;
pub use options::PipelcgOptions;
