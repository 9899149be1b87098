// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transient toast notifications.
//!
//! Success and error messages stack in the bottom-right corner and expire
//! after the configured duration.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct Toasts {
    items: Vec<Toast>,
    lifetime: Duration,
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_at(ToastKind::Success, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.push_at(ToastKind::Error, message, Instant::now());
    }

    fn push_at(&mut self, kind: ToastKind, message: String, now: Instant) {
        self.items.push(Toast {
            kind,
            message,
            expires_at: now + self.lifetime,
        });
    }

    /// Drop expired toasts.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn active(&self) -> &[Toast] {
        &self.items
    }

    /// Draw the active toasts and schedule a repaint for the next expiry.
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.prune(now);
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let (color, icon) = match toast.kind {
                        ToastKind::Success => (egui::Color32::from_rgb(90, 200, 120), "✔"),
                        ToastKind::Error => (egui::Color32::from_rgb(230, 90, 90), "✖"),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, format!("{} {}", icon, toast.message));
                    });
                    ui.add_space(4.0);
                }
            });

        if let Some(next) = self.items.iter().map(|t| t.expires_at).min() {
            ctx.request_repaint_after(next.saturating_duration_since(now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::new(Duration::from_millis(100));
        let start = Instant::now();
        toasts.push_at(ToastKind::Success, "Zone created".to_string(), start);
        toasts.push_at(ToastKind::Error, "Too few points".to_string(), start + Duration::from_millis(50));

        toasts.prune(start + Duration::from_millis(99));
        assert_eq!(toasts.active().len(), 2);

        toasts.prune(start + Duration::from_millis(120));
        assert_eq!(toasts.active().len(), 1);
        assert_eq!(toasts.active()[0].kind, ToastKind::Error);

        toasts.prune(start + Duration::from_millis(200));
        assert!(toasts.active().is_empty());
    }
}
