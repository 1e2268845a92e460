pub mod auth_handlers;
pub mod candidate_handlers;
pub mod job_handlers;
pub mod portal_handlers;
pub mod system_handlers;

pub use auth_handlers::*;
pub use candidate_handlers::*;
pub use job_handlers::*;
pub use portal_handlers::*;
pub use system_handlers::*;
