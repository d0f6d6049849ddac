pub mod concepts;
pub mod session;
