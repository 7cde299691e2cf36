pub mod dispatch;
pub mod rating;
pub mod transitions;
