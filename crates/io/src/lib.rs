// Workbook discovery, reading and output writing

pub mod csv;
pub mod error;
pub mod render;
pub mod source;
pub mod xlsx;

pub use error::IoError;
pub use render::{OutputShape, OutputSheet};
pub use source::FsSource;
