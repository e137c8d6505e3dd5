//! Client session state: a pure reducer over [`AppState`] plus the
//! [`SessionStore`] that runs the async actions feeding it.

pub mod action;
pub mod revenue;
pub mod state;
pub mod store;

pub use action::{reduce, Action, AdRevenueUpdate, NewsOutcome, PreferencesUpdate};
pub use revenue::{revenue_for, AdType, InteractionKind};
pub use state::{AdInteraction, AdRevenue, AppState, Theme, User};
pub use store::{LocationChoice, NewsQuery, SessionStore};
