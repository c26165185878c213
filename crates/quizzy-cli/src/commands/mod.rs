pub mod init;
pub mod show;
pub mod take;
pub mod topics;
pub mod validate;
