//! Grammar file ingestion

pub mod otsoft;

pub use otsoft::{parse_tableau_set, prune_lines, read_tableau_set, NumberedLine, ParseReport};
