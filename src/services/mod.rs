pub mod cookies;
pub mod error;
pub mod gemini;
pub mod password;
pub mod session;
