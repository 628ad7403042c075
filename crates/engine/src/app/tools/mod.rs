mod frame_stats;
mod overlay;

pub use frame_stats::{FrameStats, FrameStatsSummary, FRAME_STATS_WINDOW_LEN};
pub(crate) use overlay::draw_overlay;
