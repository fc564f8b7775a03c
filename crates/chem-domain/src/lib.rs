// chem-domain library entry point
pub mod audit;
pub mod error;
pub mod report;
pub mod source;
pub mod substance;
pub use audit::{LogLevel, RequestMeta, ResolutionRecord, SystemEvent};
pub use error::DomainError;
pub use report::{DegradationProduct, DegradationReport};
pub use source::ResponseSource;
pub use substance::SubstanceKey;
