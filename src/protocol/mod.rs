//! # Hub Protocol Layer
//!
//! Message model, invocation binding, and the protocol facade.
//!
//! ## Message Kinds
//! | Tag | Kind             |
//! |-----|------------------|
//! | 1   | Invocation       |
//! | 2   | StreamItem       |
//! | 3   | Completion       |
//! | 4   | StreamInvocation |
//! | 5   | CancelInvocation |
//! | 6   | Ping             |
//! | 7   | Close            |

pub mod binder;
pub mod hub;
pub mod message;
