pub mod codigo;
pub mod crypto;
pub mod format;
pub mod labels;
pub mod time;
pub mod token;
