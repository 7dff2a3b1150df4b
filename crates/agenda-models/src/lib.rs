pub mod event;
pub mod field;
pub mod instance;

pub use event::{Event, EventStatus, PublishWindow};
pub use field::FieldKind;
pub use instance::{EventInstance, InstanceStatus};
