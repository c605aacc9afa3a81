pub mod ingest;
pub mod resolve;
pub mod sync;
