pub mod dialer;
pub mod stream;
