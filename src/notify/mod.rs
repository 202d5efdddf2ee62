pub mod notifier;

pub use notifier::{DesktopNotifier, ExpiryNotifier, LogNotifier};
