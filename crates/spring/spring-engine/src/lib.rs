//! The two ends that sit opposite the classifier: a producer filling the
//! inbound region with random numbers and a consumer printing whatever shows
//! up in the outbound region.

mod generator;
mod printer;

pub use generator::Generator;
pub use printer::{ResultPrinter, wait_for_results};
