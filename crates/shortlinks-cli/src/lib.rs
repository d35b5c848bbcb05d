//! Support code for the `shortlinks` command line tool.

pub mod listener;

pub use listener::FileLengthListener;
