//! `agv-event` — the event model and the event queue.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`event`]       | `Event<W>`, `Trigger<W>`, `EventKind`                   |
//! | [`queue`]       | `EventQueue<W>`: sorted timed run + conditional set     |
//! | [`scheduler`]   | `Scheduler<'_, W>`: the handle actions schedule through |
//! | [`error`]       | `EventError`, `EventResult<T>`                          |
//!
//! `W` is the world type the simulation mutates.  Conditional predicates see
//! `&W`; actions get `&mut W` plus a [`Scheduler`] so they can chain further
//! events.
//!
//! # Dispatch rule
//!
//! ```text
//! pop_next(max):
//!   ① drain the to-check cursor: the first still-pending conditional whose
//!      predicate holds is removed and returned (cursor reset)
//!   ② else the earliest timed event with due ≤ max is returned (cursor reset)
//!   ③ else the cursor is reset and nothing is returned
//! ```

pub mod error;
pub mod event;
pub mod queue;
pub mod scheduler;


pub use error::{EventError, EventResult};
pub use event::{Action, Event, EventKind, Predicate, Trigger};
pub use queue::EventQueue;
pub use scheduler::Scheduler;
