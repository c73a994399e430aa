mod create_server_request;
mod update_server_request;

pub use create_server_request::CreateServerRequest;
pub use update_server_request::UpdateServerRequest;
