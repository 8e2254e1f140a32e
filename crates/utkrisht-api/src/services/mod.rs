pub mod cascade;
pub mod diagnostics;
pub mod email;
pub mod upload;
