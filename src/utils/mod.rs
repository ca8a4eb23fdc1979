pub mod feature_flags;
pub mod operation_errors;
pub mod redact;
pub mod suggest;
pub mod text;
pub mod target_url;
