pub mod agenda;
pub mod calendar;
pub mod serializer;
pub mod storage;

pub use calendar::{Event, EventBuilder, EventError, EventTime, Visibility};
pub use serializer::{SerializeError, to_json, to_object};
