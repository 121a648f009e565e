pub mod dispatcher;
pub mod engine;
pub mod source;
pub mod template;
pub mod transport;

pub use crate::domain::model::{Destination, FieldMap, FieldValue, NormalizationRules, Record};
pub use crate::domain::ports::{ConfigProvider, RecordSource, Transport};
pub use crate::utils::error::Result;
