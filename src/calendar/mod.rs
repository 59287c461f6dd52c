pub mod attachment;
pub mod attendee;
pub mod event;
pub mod gadget;
pub mod recurrence;
pub mod reminder;
pub mod timezone;

pub use attachment::Attachment;
pub use attendee::{Attendee, ResponseStatus};
pub use event::{Event, EventBuilder, EventError, EventTime, TimeInput, Visibility, sort_chronologically};
pub use gadget::{Gadget, GadgetDisplay};
pub use recurrence::{ByDay, Frequency, Recurrence, RecurrenceDate, RecurrenceError, RecurrenceRule};
pub use reminder::Reminder;
pub use timezone::{AmbientTimezone, SystemTimezone};
