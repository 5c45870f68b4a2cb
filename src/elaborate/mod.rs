//! The Instantiator (spec §4.4): the central Pass 1 / Pass 2 algorithm
//! that turns a parsed syntax tree into an elaborated model.

pub mod address;
pub mod instantiator;
pub mod properties;

pub use instantiator::elaborate;

/// Tunables that aren't part of the SystemRDL language itself but govern
/// how this elaboration core behaves at its edges (sizing limits, the
/// default addressing mode, and whether a misaligned register address is
/// promoted from a warning to a hard failure).
#[derive(Debug, Clone)]
pub struct ElaboratorConfig {
    pub max_array_elements: u32,
    pub max_elaboration_depth: u32,
    pub default_addressing_mode: address::AddressingMode,
    pub treat_misaligned_address_as_error: bool,
}

impl Default for ElaboratorConfig {
    fn default() -> Self {
        Self {
            max_array_elements: 65536,
            max_elaboration_depth: 256,
            default_addressing_mode: address::AddressingMode::RegAlign,
            treat_misaligned_address_as_error: false,
        }
    }
}
