mod stop_token;

pub use stop_token::StopToken;
