mod activity_items;

pub use activity_items::*;
