pub mod mode_select;
pub mod modes;
pub mod rules;
pub mod session;
