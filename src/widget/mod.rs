pub mod widget;

pub use widget::{Action, Snapshot, Update, Widget, WidgetError, expiry_message};
