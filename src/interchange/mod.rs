//! Interchange formats the elaboration core shares with its collaborators
//! (spec §6): the elaborated-model JSON consumed by template renderers and
//! report generators downstream.

pub mod json;

pub use json::to_document;
