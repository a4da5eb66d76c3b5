pub mod cache;
pub mod channel;
pub mod prime;

pub use cache::PrimeCache;
pub use channel::{ChannelError, Offer, RingChannel, RingReceiver, RingSender, Take};
pub use prime::{MillerRabin, PrimalityTest, TrialDivision, is_prime};
