pub mod event;

pub use event::{Event, EventDraft, EventRow, EventSummary, EventView, NewEvent, QualityQuery};
