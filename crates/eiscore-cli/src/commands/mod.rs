pub mod batch;
pub mod compare;
pub mod init;
pub mod score;
pub mod validate;
