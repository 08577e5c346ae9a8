//! State reconciliation layer between `doorlink-api` and UI consumers.
//!
//! - **[`Reconciler`]** — owns the authoritative client-side view of the
//!   two observable facts (armed/disarmed, door open/closed) and the
//!   transition rules for updating them from pushed events versus
//!   command acknowledgements. Renders through a [`StateSink`] observer,
//!   exactly once per actual change, so it is testable without a live
//!   socket or a DOM.
//!
//! - **[`AlarmSession`]** — facade wiring the push channel into the
//!   reconciler and dispatching control commands over HTTP. One session,
//!   one channel, one serialized stream of state mutations.

pub mod error;
pub mod reconciler;
pub mod session;
pub mod state;

pub use error::CoreError;
pub use reconciler::{Reconciler, StateSink};
pub use session::AlarmSession;
pub use state::{ArmedState, DoorState};
