mod payment;
mod project;
mod user;

pub use payment::{Payment, PaymentStatus};
pub use project::{Project, ProjectStatus};
pub use user::User;
