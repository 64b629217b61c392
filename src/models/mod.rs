//! Project scheduling domain models.
//!
//! Provides the data types shared by the graph, the codec and schedulers:
//! the saturating [`Time`] scalar, work units with their requirements,
//! contractors with their worker pools, and schedules.
//!
//! # Domain Mappings
//!
//! | u-rcpsp | Construction | Software | Events |
//! |---------|--------------|----------|--------|
//! | WorkUnit | Work package | Ticket | Setup step |
//! | WorkerReq | Crew demand | Skill demand | Staff demand |
//! | Contractor | Subcontractor | Team | Agency |
//! | Schedule | Project plan | Sprint plan | Run sheet |

mod contractor;
mod schedule;
mod time;
mod work;

pub use contractor::{Contractor, Worker};
pub use schedule::{Schedule, ScheduledWork, WorkerAssignment};
pub use time::{Time, TIME_INF};
pub use work::{DefaultWorkTimeEstimator, WorkTimeEstimator, WorkUnit, WorkerReq};
