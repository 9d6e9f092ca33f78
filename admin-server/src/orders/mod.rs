//! 订单模块
//!
//! - [`OrderLifecycle`] - 状态变更与履约副作用
//! - [`notification`] - 客户通知邮件模板

pub mod lifecycle;
pub mod notification;

pub use lifecycle::{OrderLifecycle, TransitionOutcome};
