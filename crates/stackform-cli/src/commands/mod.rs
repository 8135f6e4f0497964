pub mod init;
pub mod overrides;
pub mod render;
