// Credential endpoints: token acquisition and account creation.

pub mod login;
pub mod register;

pub use login::login;
pub use register::register;
