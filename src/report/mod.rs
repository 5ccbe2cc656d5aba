// 收集狀態與每月演出名單

pub mod listing;
pub mod status;

pub use listing::{format_yen, monthly_performers, MonthlyListing, PerformerRow};
pub use status::{status, StatusReport, VenueStatus};
