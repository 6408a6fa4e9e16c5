//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod channel;
pub mod click;
pub mod dispatch;
pub mod gateway;
pub mod password;
pub mod subscriber;
pub mod super_admin;

pub use admin::{AdminService, CreateAdminInput, UpdateAdminInput};
pub use channel::ChannelService;
pub use click::{ClickService, ClickResolution, ClickStats, RecentClick};
pub use dispatch::{
    DispatchReport, DispatchService, HistoryStats, NotificationPage, NotificationView,
    SendNotificationInput,
};
pub use gateway::{
    GatewayError, NoOpGateway, PushCredential, PushGateway, PushGatewayService, VapidConfig,
    WebPushGateway,
};
pub use subscriber::{RegisterSubscriptionInput, SubscriberService};
pub use super_admin::{ChangePasswordInput, SuperAdminService};
