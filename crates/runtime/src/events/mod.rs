//! Topic-based event bus for battle events.
//!
//! The session reports everything through its presenter; the runtime installs
//! a [`BusPresenter`] that logs each event, keeps a journal for the report, and
//! fans the event out to subscribers of its topic.

mod bus;
mod presenter;

pub use bus::{Event, EventBus, Topic};
pub use presenter::{BattleJournal, BusPresenter};
