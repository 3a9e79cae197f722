pub mod process;

pub use process::{ProcessCsvCommand, ProcessCsvResponse};
