pub mod config;
pub mod options;
mod verifier;
