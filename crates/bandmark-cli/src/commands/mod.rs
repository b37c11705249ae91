pub mod compare;
pub mod history;
pub mod init;
pub mod score;
pub mod take;
pub mod validate;
