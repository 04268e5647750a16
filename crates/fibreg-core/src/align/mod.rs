pub mod inner_rect;
pub mod phase_correlation;
pub mod translation;

pub use inner_rect::find_inner_rectangle;
pub use phase_correlation::phase_cross_correlation;
pub use translation::{accumulate, estimate_pair, estimate_translations, overlap_mask};
