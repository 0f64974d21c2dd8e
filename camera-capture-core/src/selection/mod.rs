pub mod negotiation;
pub mod size_selector;
