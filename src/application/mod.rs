pub mod diagnostics;
pub mod session;
