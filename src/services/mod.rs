pub mod catalog;
pub mod ingest;
pub mod recommendation;
pub mod training;
