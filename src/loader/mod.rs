pub mod cursor;
pub mod row;
pub mod trailer;
pub mod visible;

pub use cursor::BatchCursor;
pub use row::{BatchReport, RowLoader, RowSession, RowState, RowStats, ScrollPosition, Verdict};
pub use trailer::{find_trailer, TrailerRef};
pub use visible::{EnrichedContentItem, VerificationStatus, VisibleList};
