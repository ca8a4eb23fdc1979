pub mod operation;
pub mod payload;
pub mod response;

pub use operation::{Operation, OperationRequest, OutputFormat, SearchEngineKind};
pub use payload::FormPayload;
pub use response::{BinaryAttachment, ResponseRecord};
