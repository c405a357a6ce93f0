pub mod todo;
pub mod user;

pub use todo::{Todo, TodoDraft, TodoPatch};
pub use user::User;
