pub mod lookup;

pub use crate::domain::model::{Envelope, LookupOutcome, NormalizedRecord, Query, RawRecord};
pub use crate::domain::ports::{ConfigProvider, NumberLookup};
pub use crate::utils::error::Result;
