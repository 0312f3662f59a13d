pub mod task;
pub mod user;

pub use task::{Attachment, Task, TaskCreate, TaskUpdate, UploadResult};
pub use user::{TokenResponse, UserProfile};
