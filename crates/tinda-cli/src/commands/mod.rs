pub mod auto_backup;
pub mod backup;
pub mod history;
pub mod init;
pub mod restore;
pub mod status;
