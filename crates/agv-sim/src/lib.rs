//! `agv-sim` — the simulation clock driver.
//!
//! # Run loop
//!
//! ```text
//! run_until(horizon):
//!   loop:
//!     event = queue.pop_next(world, max = horizon)   → stop on None
//!     timed?  clock ← event.due
//!     event.execute(world, scheduler@clock)          → may enqueue more
//!   clock ← horizon
//! ```
//!
//! `advance(dt)` is `run_until(now + dt)`.  The clock only moves inside this
//! loop; actions see it read-only through their [`Scheduler`](agv_event::Scheduler).
//!
//! # Quick-start
//!
//! ```rust
//! use agv_core::{SimConfig, SimTime};
//! use agv_sim::Simulator;
//!
//! let mut sim = Simulator::new(SimConfig::default(), 0u32);
//! sim.schedule_at(SimTime(1.0), "bump", |n: &mut u32, _| {
//!     *n += 1;
//!     Ok(())
//! })
//! .unwrap();
//! sim.advance(2.5).unwrap();
//! assert_eq!(*sim.world(), 1);
//! assert_eq!(sim.current_time(), 2.5);
//! ```

pub mod error;
pub mod observer;
pub mod sim;


pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulator;
