pub mod forward_auth;
pub mod handlers;
pub mod router;
