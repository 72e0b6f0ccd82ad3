//! # pomotimer Core Library
//!
//! Business logic for a focus/break interval timer. The CLI binary is a thin
//! driver over this crate; any other front end can drive it the same way.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine. The caller passes the
//!   current time into every operation and periodically invokes `tick()`
//! - **Session Recorder**: Turns completed or abandoned intervals into
//!   immutable session records
//! - **Storage**: JSON session history, engine snapshots and TOML configuration
//! - **Notifications**: Injected collaborator traits; failures never affect
//!   the timer
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionStore`]: Session history persistence
//! - [`Config`]: Application configuration management
//! - [`NotificationScheduler`]: Trait for notification delivery

pub mod error;
pub mod events;
pub mod history;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotifyError, StoreError};
pub use events::Event;
pub use history::{Session, SessionStats, SessionStatus};
pub use notify::{authorize, NoopScheduler, NotificationAuthorizer, NotificationScheduler};
pub use storage::{Config, EngineStateStore, SessionStore};
pub use timer::{EngineSnapshot, Mode, RunState, SessionRecorder, TimerEngine};
