// ABOUTME: Token-gated access to lintulista lists: login, logout, and observation reads and writes.
// ABOUTME: Combines the observation codec, session tokens, and a column store behind one facade.

pub mod accessor;
pub mod clock;
pub mod config;
pub mod error;
pub mod password;
pub mod provision;
pub mod session;
pub mod token;

pub use accessor::ListAccessor;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LintulistaConfig, SessionPolicy};
pub use error::AccessError;
pub use provision::create_list;
pub use session::{LoginOutcome, SessionGrant, SessionManager};
