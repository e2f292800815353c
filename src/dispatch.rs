//! Row binding: maps a row position to either the load-more row or exactly
//! one of the three fetch strategies, selected by a deterministic
//! period-3 round-robin.

use crate::constants::{STRATEGY_CYCLE, TARGET_HEIGHT, TARGET_WIDTH};
use crate::fetch::{new_surface, FetchRequest, ImageFetchStrategy, SurfaceHandle};
use crate::model::ImageList;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Crossfade,
    FadeIn,
    Direct,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Crossfade => "crossfade",
            StrategyKind::FadeIn => "fade-in",
            StrategyKind::Direct => "direct",
        }
    }
}

/// The two "next eligible position" counters driving the rotation.
/// Crossfade anchors at 0, fade-in at 1; everything else falls through to
/// the default strategy. A matched counter advances by the full cycle
/// width, so the same strategy comes up again exactly one cycle later.
pub struct RotationState {
    next_crossfade: usize,
    next_fade_in: usize,
}

impl RotationState {
    pub fn new() -> Self {
        Self {
            next_crossfade: 0,
            next_fade_in: 1,
        }
    }

    /// Exact-equality match, not modulo arithmetic: counters only move when
    /// consumed, which keeps the assignment a pure function of call order.
    pub fn select(&mut self, position: usize) -> StrategyKind {
        if position == self.next_crossfade {
            self.next_crossfade += STRATEGY_CYCLE;
            StrategyKind::Crossfade
        } else if position == self.next_fade_in {
            self.next_fade_in += STRATEGY_CYCLE;
            StrategyKind::FadeIn
        } else {
            StrategyKind::Direct
        }
    }
}

/// Result of binding a row.
pub enum RowBinding {
    /// The synthetic trailing row; no image work performed.
    LoadMore,
    /// An image row: the strategy that was invoked and the surface it will
    /// resolve.
    Image {
        strategy: StrategyKind,
        surface: SurfaceHandle,
    },
}

pub struct Dispatcher {
    rotation: RotationState,
    /// Strategy chosen the first time each position was bound. Rebinding an
    /// unchanged row repeats the choice instead of consulting (and skewing)
    /// the rotation counters.
    assignments: HashMap<usize, StrategyKind>,
    crossfade: Box<dyn ImageFetchStrategy>,
    fade_in: Box<dyn ImageFetchStrategy>,
    direct: Box<dyn ImageFetchStrategy>,
}

impl Dispatcher {
    pub fn new(
        crossfade: Box<dyn ImageFetchStrategy>,
        fade_in: Box<dyn ImageFetchStrategy>,
        direct: Box<dyn ImageFetchStrategy>,
    ) -> Self {
        Self {
            rotation: RotationState::new(),
            assignments: HashMap::new(),
            crossfade,
            fade_in,
            direct,
        }
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn ImageFetchStrategy {
        match kind {
            StrategyKind::Crossfade => self.crossfade.as_ref(),
            StrategyKind::FadeIn => self.fade_in.as_ref(),
            StrategyKind::Direct => self.direct.as_ref(),
        }
    }

    /// Bind one row. The position equal to the list length is the load-more
    /// row; every other position addresses a descriptor and dispatches to
    /// exactly one strategy.
    pub fn bind_row(&mut self, list: &ImageList, position: usize) -> RowBinding {
        // Positions at or past the end all resolve to the trailing row.
        let Some(descriptor) = list.get(position) else {
            return RowBinding::LoadMore;
        };

        let kind = match self.assignments.get(&position) {
            Some(kind) => *kind,
            None => {
                let kind = self.rotation.select(position);
                self.assignments.insert(position, kind);
                kind
            }
        };

        let strategy = self.strategy(kind);
        debug!(
            position,
            url = %descriptor.url,
            strategy = strategy.name(),
            "image row bound"
        );

        let surface = new_surface();
        strategy.fetch(FetchRequest {
            url: descriptor.url.clone(),
            surface: surface.clone(),
            width: TARGET_WIDTH,
            height: TARGET_HEIGHT,
        });

        RowBinding::Image {
            strategy: kind,
            surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SurfaceState;
    use std::sync::{Arc, Mutex};

    /// Records every URL it is asked to fetch; optionally resolves the
    /// surface to `Failed` the way a real strategy does on error.
    struct MockStrategy {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ImageFetchStrategy for MockStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn fetch(&self, request: FetchRequest) {
            self.calls.lock().unwrap().push(request.url);
            if self.fail {
                *request.surface.lock().unwrap() = SurfaceState::Failed;
            }
        }
    }

    fn dispatcher_with_mocks(
        fail: bool,
    ) -> (Dispatcher, [Arc<Mutex<Vec<String>>>; 3]) {
        let calls: [Arc<Mutex<Vec<String>>>; 3] = Default::default();
        let dispatcher = Dispatcher::new(
            Box::new(MockStrategy { name: "crossfade", calls: calls[0].clone(), fail }),
            Box::new(MockStrategy { name: "fade-in", calls: calls[1].clone(), fail }),
            Box::new(MockStrategy { name: "direct", calls: calls[2].clone(), fail }),
        );
        (dispatcher, calls)
    }

    fn bound_kind(binding: &RowBinding) -> Option<StrategyKind> {
        match binding {
            RowBinding::LoadMore => None,
            RowBinding::Image { strategy, .. } => Some(*strategy),
        }
    }

    #[test]
    fn empty_list_binds_load_more_without_fetching() {
        let (mut dispatcher, calls) = dispatcher_with_mocks(false);
        let list = ImageList::new();
        assert!(matches!(dispatcher.bind_row(&list, 0), RowBinding::LoadMore));
        for c in &calls {
            assert!(c.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn single_row_list_binds_crossfade_then_load_more() {
        let (mut dispatcher, calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        list.generate_batch(1);

        let first = dispatcher.bind_row(&list, 0);
        assert_eq!(bound_kind(&first), Some(StrategyKind::Crossfade));
        assert!(matches!(dispatcher.bind_row(&list, 1), RowBinding::LoadMore));

        assert_eq!(calls[0].lock().unwrap().len(), 1);
        assert!(calls[1].lock().unwrap().is_empty());
        assert!(calls[2].lock().unwrap().is_empty());
    }

    #[test]
    fn four_rows_dispatch_in_order_a_b_c_a() {
        let (mut dispatcher, _calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        list.generate_batch(4);

        let kinds: Vec<StrategyKind> = (0..4)
            .map(|p| bound_kind(&dispatcher.bind_row(&list, p)).unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::Crossfade,
                StrategyKind::FadeIn,
                StrategyKind::Direct,
                StrategyKind::Crossfade,
            ]
        );
    }

    #[test]
    fn rotation_repeats_with_period_three() {
        let (mut dispatcher, _calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        list.generate_batch(30);

        for p in 0..30 {
            let kind = bound_kind(&dispatcher.bind_row(&list, p)).unwrap();
            let expected = match p % 3 {
                0 => StrategyKind::Crossfade,
                1 => StrategyKind::FadeIn,
                _ => StrategyKind::Direct,
            };
            assert_eq!(kind, expected, "position {}", p);
        }
    }

    #[test]
    fn rebinding_unchanged_row_repeats_the_same_strategy() {
        let (mut dispatcher, calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        list.generate_batch(2);

        let first = bound_kind(&dispatcher.bind_row(&list, 0)).unwrap();
        let second = bound_kind(&dispatcher.bind_row(&list, 0)).unwrap();
        assert_eq!(first, second);
        // Both binds invoked the strategy, and only that strategy.
        assert_eq!(calls[0].lock().unwrap().len(), 2);
        assert!(calls[1].lock().unwrap().is_empty());
        assert!(calls[2].lock().unwrap().is_empty());
        // Rebinding did not skew the rotation for the next position.
        assert_eq!(
            bound_kind(&dispatcher.bind_row(&list, 1)),
            Some(StrategyKind::FadeIn)
        );
    }

    #[test]
    fn exactly_one_strategy_runs_per_image_row() {
        let (mut dispatcher, calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        list.generate_batch(9);

        for p in 0..9 {
            dispatcher.bind_row(&list, p);
        }
        let total: usize = calls.iter().map(|c| c.lock().unwrap().len()).sum();
        assert_eq!(total, 9);
        assert_eq!(calls[0].lock().unwrap().len(), 3);
        assert_eq!(calls[1].lock().unwrap().len(), 3);
        assert_eq!(calls[2].lock().unwrap().len(), 3);
    }

    #[test]
    fn load_more_row_becomes_image_row_after_append() {
        let (mut dispatcher, _calls) = dispatcher_with_mocks(false);
        let mut list = ImageList::new();
        let range = list.load_more();
        assert_eq!(range.start, 0);

        // Row 20 is the trailing row until the next batch lands.
        assert!(matches!(dispatcher.bind_row(&list, 20), RowBinding::LoadMore));
        let range = list.load_more();
        assert_eq!(range.start, 20);
        assert_eq!(list.len(), 40);
        assert!(matches!(
            dispatcher.bind_row(&list, 20),
            RowBinding::Image { .. }
        ));
        assert!(matches!(dispatcher.bind_row(&list, 40), RowBinding::LoadMore));
    }

    #[test]
    fn strategy_failure_is_absorbed_by_the_surface() {
        let (mut dispatcher, _calls) = dispatcher_with_mocks(true);
        let mut list = ImageList::new();
        list.generate_batch(1);

        let binding = dispatcher.bind_row(&list, 0);
        let RowBinding::Image { surface, .. } = binding else {
            panic!("expected image binding");
        };
        assert!(matches!(*surface.lock().unwrap(), SurfaceState::Failed));
        // The trailing row is still bindable after a failure.
        assert!(matches!(dispatcher.bind_row(&list, 1), RowBinding::LoadMore));
    }
}
