// doorlink-api: async client for the alarm appliance (push channel + control HTTP)

pub mod channel;
pub mod codec;
pub mod control;
pub mod error;
pub mod transport;

pub use error::Error;
