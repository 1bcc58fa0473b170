mod client;
mod events;
pub mod signature;

pub use client::SlackClient;
pub use events::{Envelope, Event, router, verified_envelope};
