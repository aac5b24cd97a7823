mod action;

pub use action::ActionRecord;
