pub mod copy;
pub mod plan;
pub mod schema;
pub mod show;
