//! Database entities.

pub mod admin;
pub mod click_record;
pub mod notification;
pub mod subscription;
pub mod super_admin;

pub use admin::Entity as Admin;
pub use click_record::Entity as ClickRecord;
pub use notification::Entity as Notification;
pub use subscription::Entity as Subscription;
pub use super_admin::Entity as SuperAdmin;
