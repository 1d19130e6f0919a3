//! Ember DNS Infrastructure Layer
//!
//! Everything that touches bytes or the OS: the hickory-proto wire boundary,
//! the UDP upstream forwarder, the JSON snapshot persistence, and the UDP
//! server loop.
pub mod dns;
pub mod persistence;
