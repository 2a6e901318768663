pub mod compile;
pub mod convert;
pub mod init;

pub use compile::{compile, CompileArgs};
pub use convert::{convert, ConvertArgs};
pub use init::{init, InitArgs};
