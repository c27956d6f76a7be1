pub mod local_port;
pub mod shell;
