// 月播放清單：權重輪替、spotlight 與位置整理

pub mod positions;
pub mod rotation;
pub mod spotlight;

pub use positions::{fix_positions, PlaylistFix, PositionChange};
pub use rotation::{
    commit_rotation, plan_rotation, playlist_description, playlist_title, RotationPick,
    RotationPlan, DEFAULT_PLAYLIST_SIZE,
};
pub use spotlight::{add_spotlight, SpotlightEntry, DEFAULT_MAX_MINUTES};
