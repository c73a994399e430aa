pub mod application;
pub mod poller;
