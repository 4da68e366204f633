//! examples of usage of RustedDTM
/// price reduction problem solved by the differential transform method
pub mod dtm_examples;
