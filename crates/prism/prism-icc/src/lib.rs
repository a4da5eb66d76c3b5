mod cursor;
mod layout;
mod sink;
mod source;

pub use cursor::CyclicCursor;
pub use layout::{INT_SIZE, RECORD_SIZE, bytes_for_ints, bytes_for_records, slots_in_region};
pub use sink::{ResultSink, SharedResultReader, SharedResultSink};
pub use source::{IntegerSource, SharedIntegerSource, SharedIntegerWriter};
