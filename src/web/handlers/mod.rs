pub mod match_handlers;
pub mod project_handlers;
pub mod system_handlers;
pub mod workspace_handlers;

pub use match_handlers::*;
pub use project_handlers::*;
pub use system_handlers::*;
pub use workspace_handlers::*;
