pub mod dispatcher;
pub mod logger;
pub mod transport;
pub mod validation;
