mod compare;
mod init;

pub use self::compare::{OutputOptions, compare};
pub use self::init::init;
