pub mod init;
pub mod prompts;
pub mod signals;
pub mod sync;
pub mod sync_ui;
