//! Post-elaboration Validator (spec §4.5): per-register field layout and
//! per-container address-overlap checks, run at register and parent
//! boundaries as the Instantiator completes each node.

pub mod container;
pub mod register;

pub use container::check_no_overlap;
pub use register::finalize_register;
