mod not_found;
mod recent_actions;

pub use not_found::*;
pub use recent_actions::*;
