pub mod args;
pub mod discover;
pub mod help;
pub mod parallel_stride;
pub(crate) mod profile;
pub mod resolve;
pub mod run;
pub mod watch;

#[cfg(test)]
mod watch_test;
