//! Headless interaction primitives shared by the terminal views.
//!
//! Each primitive is a small state machine driven synchronously from the event
//! loop. Parts of a component (trigger, content, option items) receive the
//! controller handle explicitly; there is no ambient lookup.

pub mod dismiss;
pub mod overlay;
pub mod select;
pub mod tabs;
pub mod toast;

use std::rc::Rc;

pub use dismiss::{ListenerGuard, PointerEvent, PointerListeners};
pub use overlay::{Button, Overlay, OverlayHit, OverlayLayout, OverlayMode, OverlayProps, Trigger};
pub use select::{OptionItem, Select};
pub use tabs::{TabTrigger, Tabs};
pub use toast::{Toast, ToastOptions, ToastSender, ToastVariant, Toaster};

/// Notification sink for open/close transitions.
pub type OpenChangeFn = Rc<dyn Fn(bool)>;

/// Notification sink for value changes (selects, tabs).
pub type ValueChangeFn = Rc<dyn Fn(&str)>;

/// Click handler attached to a button.
pub type ClickFn = Rc<dyn Fn()>;
