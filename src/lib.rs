pub mod args;
pub mod error;
pub mod output;
pub mod parser;
pub mod persist;
pub mod record;
pub mod transform;
