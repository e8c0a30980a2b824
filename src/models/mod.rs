mod auth;
mod delete_target;
pub mod document;
mod labels;
mod product;
mod response;
mod stats;
mod user;

pub use auth::*;
pub use delete_target::DeleteTarget;
pub use labels::LabelSet;
pub use product::*;
pub use response::ActionResponse;
pub use stats::*;
pub use user::*;
