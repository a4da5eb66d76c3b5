pub mod classification;
pub use classification::{ClassificationResult, ResultRecord, TAG_COMPOSITE, TAG_PRIME};

// Values with a reserved meaning on the inbound integer stream. Neither is ever
// classified or forwarded to the outbound stream.

/// End-of-stream marker written once by the producer.
pub const SENTINEL: i32 = i32::MIN;

/// "No number here yet" placeholder; the reader skips it.
pub const IDLE: i32 = 0;
