pub mod accessor;
pub mod dispatch;
pub mod ticker;
pub mod transition;
