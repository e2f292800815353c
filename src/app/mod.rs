//! App module - contains the main application state and logic

mod gallery;

use crate::constants::BATCH_SIZE;
use crate::dispatch::{Dispatcher, StrategyKind};
use crate::fetch::{CrossfadeStrategy, DirectStrategy, FadeInStrategy, SurfaceHandle};
use crate::model::{ImageList, InsertedRange};
use crate::settings::Settings;
use crate::theme;
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Per-row presentation state: the shared surface the fetch task resolves,
/// plus the uploaded texture and the timestamp driving the fade transition.
pub(crate) struct RowSurface {
    pub(crate) strategy: StrategyKind,
    pub(crate) shared: SurfaceHandle,
    pub(crate) texture: Option<egui::TextureHandle>,
    pub(crate) ready_at: Option<Instant>,
}

pub struct App {
    pub(crate) images: ImageList,
    pub(crate) dispatcher: Dispatcher,
    // Held for the app lifetime; the strategies only hold handles into it.
    pub(crate) runtime: tokio::runtime::Runtime,
    // Rows bound so far, keyed by position. Positions are stable because the
    // list is append-only, so entries are never invalidated.
    pub(crate) rows: HashMap<usize, RowSurface>,
    // Range appended by the latest load-more, highlighted briefly.
    pub(crate) recent_insert: Option<(InsertedRange, Instant)>,
    pub(crate) scroll_to_row: Option<usize>,
    // Window bookkeeping
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, data_dir: PathBuf) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let runtime = tokio::runtime::Runtime::new().unwrap();

        let dispatcher = Dispatcher::new(
            Box::new(CrossfadeStrategy::new(
                runtime.handle().clone(),
                cc.egui_ctx.clone(),
            )),
            Box::new(FadeInStrategy::new(
                runtime.handle().clone(),
                cc.egui_ctx.clone(),
            )),
            Box::new(DirectStrategy::new(
                runtime.handle().clone(),
                cc.egui_ctx.clone(),
            )),
        );

        let mut images = ImageList::new();
        let initial = images.generate_batch(BATCH_SIZE);
        info!(count = initial.count, "Initial batch generated");

        Self {
            images,
            dispatcher,
            runtime,
            rows: HashMap::new(),
            recent_insert: None,
            scroll_to_row: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    /// Load-more activation: append one batch and stage the inserted range
    /// so the view highlights and scrolls to exactly the new rows.
    pub(crate) fn append_more_rows(&mut self) {
        let inserted = self.images.load_more();
        info!(
            start = inserted.start,
            count = inserted.count,
            total = self.images.len(),
            "Batch appended"
        );
        self.recent_insert = Some((inserted, Instant::now()));
        self.scroll_to_row = Some(inserted.start);
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
        };
        settings.save(&self.data_dir);
    }
}
