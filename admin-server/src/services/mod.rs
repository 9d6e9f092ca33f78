//! 服务模块
//!
//! - [`email`] - 邮件发送 (SMTP / 仅日志)
//! - [`image_store`] - 上传图片存储

pub mod email;
pub mod image_store;

pub use email::{EmailError, LogMailer, Mailer, OutgoingEmail, SharedMailer, SmtpMailer};
pub use image_store::ImageStore;
