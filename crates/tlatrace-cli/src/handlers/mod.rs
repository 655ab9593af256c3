pub mod count;
pub mod paths;
pub mod read;
pub mod summary;
pub mod watch;
