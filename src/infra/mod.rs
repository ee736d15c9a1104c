pub mod keys;
pub mod spotify;
