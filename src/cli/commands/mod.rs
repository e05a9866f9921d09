pub mod add;
pub mod config;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod jobs;
pub mod logs;
pub mod records;
pub mod retry;
