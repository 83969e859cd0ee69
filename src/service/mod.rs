//! Record operations and request validation on top of the store.

mod records;
pub mod validation;
pub use records::RecordService;
pub use validation::RequestValidator;
