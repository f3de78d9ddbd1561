mod auth_service_fake;
mod auth_service_impl;
mod session_store_impl;
mod user_repo_memory;

pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use session_store_impl::*;
pub use user_repo_memory::*;
