//! Scan lifecycle: intake creates records, the processor settles them, the
//! dispatcher runs the processor in the background and the viewer reads the
//! results back for their owner.

pub mod catalog;
pub mod dispatch;
pub mod intake;
pub mod outcome;
pub mod processor;
pub mod viewer;
