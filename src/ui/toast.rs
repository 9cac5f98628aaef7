//! Fire-and-forget notifications.
//!
//! Producers hold a cloneable [`ToastSender`]; the single [`Toaster`] drains
//! the channel once per frame, keeps the newest few entries, and expires each
//! one a fixed time after it arrived.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_VISIBLE: usize = 5;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl ToastOptions {
    pub fn title(title: impl Into<String>) -> Self {
        ToastOptions {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = ToastVariant::Destructive;
        self
    }

    /// "title: description", skipping whichever part is absent.
    pub fn message(&self) -> String {
        [self.title.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(": ")
    }
}

/// A toast on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub options: ToastOptions,
    pub shown_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ToastSender {
    tx: Sender<ToastOptions>,
}

impl ToastSender {
    /// Queue a toast. Delivery is best effort: if the display is gone the
    /// toast is dropped.
    pub fn toast(&self, options: ToastOptions) {
        match options.variant {
            ToastVariant::Default => tracing::info!(message = %options.message(), "toast"),
            ToastVariant::Destructive => tracing::warn!(message = %options.message(), "toast"),
        }
        let _ = self.tx.send(options);
    }
}

#[derive(Debug)]
pub struct Toaster {
    rx: Receiver<ToastOptions>,
    toasts: Vec<Toast>,
    next_id: u64,
    max_visible: usize,
    duration: Duration,
}

/// Create a connected sender / display pair.
pub fn channel(max_visible: usize, duration: Duration) -> (ToastSender, Toaster) {
    let (tx, rx) = mpsc::channel();
    (
        ToastSender { tx },
        Toaster {
            rx,
            toasts: Vec::new(),
            next_id: 0,
            max_visible: max_visible.max(1),
            duration,
        },
    )
}

impl Toaster {
    /// Pull every queued toast, stamping each with `now`.
    pub fn drain(&mut self, now: Instant) {
        while let Ok(options) = self.rx.try_recv() {
            self.push(options, now);
        }
    }

    pub fn push(&mut self, options: ToastOptions, now: Instant) {
        if self.toasts.len() >= self.max_visible {
            let excess = self.toasts.len() + 1 - self.max_visible;
            self.toasts.drain(..excess);
        }
        self.toasts.push(Toast {
            id: self.next_id,
            options,
            shown_at: now,
        });
        self.next_id += 1;
    }

    /// Drop toasts whose display time has elapsed.
    pub fn prune(&mut self, now: Instant) {
        let duration = self.duration;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < duration);
    }

    /// Oldest first.
    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    /// When the next toast expires, for sizing the event poll timeout.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.toasts.iter().map(|t| t.shown_at + self.duration).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles(toaster: &Toaster) -> Vec<String> {
        toaster
            .visible()
            .iter()
            .map(|t| t.options.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn keeps_five_most_recent() {
        let (tx, mut toaster) = channel(DEFAULT_MAX_VISIBLE, DEFAULT_DURATION);
        for i in 0..7 {
            tx.toast(ToastOptions::title(format!("t{i}")));
        }
        toaster.drain(Instant::now());
        assert_eq!(titles(&toaster), vec!["t2", "t3", "t4", "t5", "t6"]);
    }

    #[test]
    fn each_toast_expires_independently() {
        let (_tx, mut toaster) = channel(DEFAULT_MAX_VISIBLE, DEFAULT_DURATION);
        let start = Instant::now();
        toaster.push(ToastOptions::title("first"), start);
        toaster.push(ToastOptions::title("second"), start + Duration::from_millis(1500));

        toaster.prune(start + Duration::from_millis(3999));
        assert_eq!(titles(&toaster), vec!["first", "second"]);

        toaster.prune(start + Duration::from_millis(4000));
        assert_eq!(titles(&toaster), vec!["second"]);

        toaster.prune(start + Duration::from_millis(5500));
        assert!(toaster.visible().is_empty());
    }

    #[test]
    fn ids_are_unique_even_with_equal_timestamps() {
        let (_tx, mut toaster) = channel(DEFAULT_MAX_VISIBLE, DEFAULT_DURATION);
        let now = Instant::now();
        toaster.push(ToastOptions::title("a"), now);
        toaster.push(ToastOptions::title("b"), now);
        assert_ne!(toaster.visible()[0].id, toaster.visible()[1].id);
    }

    #[test]
    fn next_expiry_is_earliest() {
        let (_tx, mut toaster) = channel(DEFAULT_MAX_VISIBLE, DEFAULT_DURATION);
        assert_eq!(toaster.next_expiry(), None);
        let now = Instant::now();
        toaster.push(ToastOptions::title("a"), now);
        toaster.push(ToastOptions::title("b"), now + Duration::from_secs(1));
        assert_eq!(toaster.next_expiry(), Some(now + DEFAULT_DURATION));
    }

    #[test]
    fn message_joins_present_parts() {
        assert_eq!(
            ToastOptions::title("Saved").description("Task updated").message(),
            "Saved: Task updated"
        );
        let only_desc = ToastOptions {
            description: Some("oops".into()),
            ..Default::default()
        };
        assert_eq!(only_desc.message(), "oops");
    }

    #[test]
    fn send_after_display_dropped_is_silent() {
        let (tx, toaster) = channel(DEFAULT_MAX_VISIBLE, DEFAULT_DURATION);
        drop(toaster);
        tx.toast(ToastOptions::title("nobody listening").destructive());
    }
}
