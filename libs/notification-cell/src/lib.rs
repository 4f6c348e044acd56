pub mod dispatcher;
pub mod models;

pub use dispatcher::{
    format_admin_cancellation, format_admin_reminder, format_cancellation, format_reminder,
    ChatBotDispatcher, NotificationDispatcher,
};
pub use models::*;
