//! Database repositories.

mod admin;
mod click_record;
mod notification;
mod subscription;
mod super_admin;

pub use admin::AdminRepository;
pub use click_record::ClickRecordRepository;
pub use notification::{NotificationRepository, NotificationStats};
pub use subscription::SubscriptionRepository;
pub use super_admin::SuperAdminRepository;
