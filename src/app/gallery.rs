//! Gallery view: the scrolling feed of image rows plus the trailing
//! load-more row.

use super::{App, RowSurface};
use crate::constants::{BATCH_SIZE, CROSSFADE_MS, FADE_IN_MS, TARGET_HEIGHT, TARGET_WIDTH};
use crate::dispatch::{RowBinding, StrategyKind};
use crate::fetch::SurfaceState;
use crate::theme;
use eframe::egui;
use std::time::{Duration, Instant};

/// How long freshly appended rows keep their accent highlight.
const INSERT_HIGHLIGHT_MS: u64 = 1200;

impl App {
    pub(crate) fn render_gallery(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        // Expire the insert highlight once its window has passed.
        if let Some((_, since)) = self.recent_insert {
            if since.elapsed() > Duration::from_millis(INSERT_HIGHLIGHT_MS) {
                self.recent_insert = None;
            }
        }

        let total_rows = self.images.len() + 1;
        let mut scroll = egui::ScrollArea::vertical().auto_shrink([false, false]);
        if let Some(row) = self.scroll_to_row.take() {
            let spacing = ui.spacing().item_spacing.y;
            scroll = scroll.vertical_scroll_offset((theme::ROW_HEIGHT + spacing) * row as f32);
        }

        scroll.show_rows(ui, theme::ROW_HEIGHT, total_rows, |ui, range| {
            for position in range {
                if position == self.images.len() {
                    self.render_load_more_row(ui);
                } else {
                    self.render_image_row(ui, ctx, position);
                }
            }
        });
    }

    /// Bind the row on first visibility; afterwards just draw the surface.
    fn render_image_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, position: usize) {
        if !self.rows.contains_key(&position) {
            if let RowBinding::Image { strategy, surface } =
                self.dispatcher.bind_row(&self.images, position)
            {
                self.rows.insert(
                    position,
                    RowSurface {
                        strategy,
                        shared: surface,
                        texture: None,
                        ready_at: None,
                    },
                );
            }
        }

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), theme::ROW_HEIGHT),
            egui::Sense::hover(),
        );
        if !ui.is_rect_visible(rect) {
            return;
        }

        let image_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(8.0, 8.0),
            egui::vec2(TARGET_WIDTH as f32, TARGET_HEIGHT as f32),
        );

        let Some(row) = self.rows.get_mut(&position) else {
            return;
        };

        // Upload the texture once the fetch task has resolved the surface.
        if row.texture.is_none() {
            let state = row.shared.lock().unwrap();
            if let SurfaceState::Ready(image) = &*state {
                let texture = ctx.load_texture(
                    format!("row_{}", position),
                    image.clone(),
                    egui::TextureOptions::LINEAR,
                );
                drop(state);
                row.texture = Some(texture);
                row.ready_at = Some(Instant::now());
            }
        }
        let failed = matches!(*row.shared.lock().unwrap(), SurfaceState::Failed);

        let painter = ui.painter();
        match (&row.texture, failed) {
            (Some(texture), _) => {
                // Transition depends on the strategy that loaded the row.
                let fade_ms = match row.strategy {
                    StrategyKind::Crossfade => CROSSFADE_MS,
                    StrategyKind::FadeIn => FADE_IN_MS,
                    StrategyKind::Direct => 0,
                };
                let alpha = fade_alpha(row.ready_at, fade_ms);
                if alpha < 1.0 {
                    // Placeholder underneath, image fading in over it.
                    painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);
                    ctx.request_repaint();
                }
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE.gamma_multiply(alpha),
                );
            }
            (None, true) => match row.strategy {
                // The default strategy signals failure with a solid fill,
                // the other two fall back to the placeholder glyph.
                StrategyKind::Direct => {
                    painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::STATUS_ERROR);
                }
                _ => {
                    painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);
                    painter.text(
                        image_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        egui_phosphor::regular::IMAGE_BROKEN,
                        egui::FontId::proportional(28.0),
                        theme::TEXT_DIM,
                    );
                }
            },
            (None, false) => {
                painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);
                painter.text(
                    image_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    egui_phosphor::regular::IMAGE,
                    egui::FontId::proportional(28.0),
                    theme::TEXT_DIM,
                );
            }
        }

        // Caption: position, strategy, and source URL.
        let caption_x = image_rect.right() + 16.0;
        let url = self
            .images
            .get(position)
            .map(|d| d.url.clone())
            .unwrap_or_default();
        painter.text(
            egui::pos2(caption_x, image_rect.top() + 14.0),
            egui::Align2::LEFT_CENTER,
            format!("#{}  ·  {}", position, row.strategy.label()),
            egui::FontId::proportional(13.0),
            theme::TEXT_SECONDARY,
        );
        painter.text(
            egui::pos2(caption_x, image_rect.top() + 36.0),
            egui::Align2::LEFT_CENTER,
            url,
            egui::FontId::proportional(11.0),
            theme::TEXT_DIM,
        );

        // Accent outline on rows from the most recent batch.
        if let Some((inserted, _)) = self.recent_insert {
            if inserted.contains(position) {
                painter.rect_stroke(
                    rect.shrink(2.0),
                    theme::RADIUS_DEFAULT,
                    egui::Stroke::new(theme::STROKE_MEDIUM, theme::ACCENT),
                    egui::StrokeKind::Inside,
                );
                ctx.request_repaint();
            }
        }
    }

    fn render_load_more_row(&mut self, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), theme::ROW_HEIGHT),
            egui::Sense::hover(),
        );
        if !ui.is_rect_visible(rect) {
            return;
        }

        let button_rect = egui::Rect::from_center_size(
            rect.center(),
            egui::vec2(220.0, theme::LOAD_MORE_HEIGHT),
        );
        let response = ui.interact(
            button_rect,
            ui.id().with("load_more_button"),
            egui::Sense::click(),
        );
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let (fill, draw_rect) = theme::button_visual(&response, theme::BTN_ACCENT, button_rect);
        ui.painter().rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
        ui.painter().text(
            draw_rect.center(),
            egui::Align2::CENTER_CENTER,
            format!(
                "{} Load {} more",
                egui_phosphor::regular::PLUS_CIRCLE,
                BATCH_SIZE
            ),
            egui::FontId::proportional(14.0),
            egui::Color32::from_rgb(0x04, 0x2f, 0x2e), // teal-950
        );

        if response.clicked() {
            self.append_more_rows();
        }
    }
}

fn fade_alpha(ready_at: Option<Instant>, fade_ms: u64) -> f32 {
    match ready_at {
        Some(at) if fade_ms > 0 => {
            (at.elapsed().as_millis() as f32 / fade_ms as f32).clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}
