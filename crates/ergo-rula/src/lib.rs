//! # Ergo-RULA
//!
//! RULA-style ergonomic risk scoring over canonical pose frames.
//!
//! ## Scoring Model
//!
//! Each frame is scored from two independent families of contributions:
//!
//! 1. **Angle regions** - upper arm, lower arm, wrist, neck, trunk and legs.
//!    Each region names a joint triple per body side; the angle at the middle
//!    joint is looked up in the region's [`ScoreTable`].
//! 2. **Posture rules** - boolean predicates such as ulnar deviation or arm
//!    abduction that add a fixed delta when they hold.
//!
//! Left and right sides are evaluated separately and summed. A region or rule
//! whose joints are not all present contributes nothing.
//!
//! ## Action Levels
//!
//! The aggregate score is mapped to an [`ActionLevel`] through ordered,
//! first-match-wins breakpoints (7 / 5 / 3 / 0 in the calibrated profile).

pub mod action;
pub mod profile;
pub mod region;
pub mod rules;
pub mod scorer;
pub mod table;

pub use action::*;
pub use profile::*;
pub use region::*;
pub use rules::*;
pub use scorer::*;
pub use table::*;
