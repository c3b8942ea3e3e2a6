pub mod habit;
pub mod user;

pub use habit::Habit;
pub use user::User;
