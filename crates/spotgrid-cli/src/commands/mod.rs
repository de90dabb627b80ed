pub mod advise;
pub mod catalog;
pub mod init;
