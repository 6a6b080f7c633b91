mod activity;

pub use activity::*;

pub const V1_PUBLIC: &str = "/api/v1/public";
