pub mod cursor;
pub mod error;
pub mod hotspot;
pub mod record;
pub mod segment;

pub use cursor::RecordCursor;
pub use error::{RecordError, Result};
pub use hotspot::{HotspotDesc, Rect};
pub use record::{RecordBody, RecordKind, parse_record, read_record};
pub use segment::{ScriptSegment, SegmentEntry};
