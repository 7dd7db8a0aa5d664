pub mod presence;
pub mod user;

pub use presence::*;
pub use user::*;
