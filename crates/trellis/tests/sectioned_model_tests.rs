//! Integration tests for sectioned model reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use trellis::model::{SectionedModel, SectionedModelConfig, SectionedModelDelegate};
use trellis_core::{IdleQueue, ImmediateScheduler};

/// Delegate that replays every notification onto its own copy of the
/// displayed state and records the order of callbacks.
#[derive(Default)]
struct Mirror {
    sections: Mutex<Vec<u32>>,
    items: Mutex<HashMap<u32, Vec<u32>>>,
    log: Mutex<Vec<String>>,
    empty_transitions: Mutex<Vec<bool>>,
}

impl Mirror {
    fn sections(&self) -> Vec<u32> {
        self.sections.lock().clone()
    }

    fn items(&self, section: u32) -> Vec<u32> {
        self.items.lock().get(&section).cloned().unwrap_or_default()
    }
}

impl SectionedModelDelegate<u32, u32> for Mirror {
    fn section_added(&self, section: &u32, index: usize) {
        self.sections.lock().insert(index, *section);
        self.items.lock().insert(*section, Vec::new());
        self.log.lock().push(format!("+s{section}@{index}"));
    }

    fn section_removed(&self, section: &u32, index: usize) {
        let removed = self.sections.lock().remove(index);
        assert_eq!(removed, *section, "section removed at wrong index");
        self.items.lock().remove(section);
        self.log.lock().push(format!("-s{section}@{index}"));
    }

    fn item_added(&self, item: &u32, index: usize, section: &u32) {
        assert!(
            self.sections.lock().contains(section),
            "item added to undisplayed section {section}"
        );
        self.items
            .lock()
            .entry(*section)
            .or_default()
            .insert(index, *item);
        self.log.lock().push(format!("+i{item}@{index}/s{section}"));
    }

    fn item_removed(&self, item: &u32, index: usize, section: &u32) {
        let removed = self
            .items
            .lock()
            .get_mut(section)
            .map(|items| items.remove(index));
        assert_eq!(removed, Some(*item), "item removed at wrong index");
        self.log.lock().push(format!("-i{item}@{index}/s{section}"));
    }

    fn is_empty_changed(&self, is_empty: bool) {
        self.empty_transitions.lock().push(is_empty);
    }
}

/// Distinct values from `0..universe` in random order, at most `max_len`.
fn subset(rng: &mut StdRng, universe: u32, max_len: usize) -> Vec<u32> {
    let mut values: Vec<u32> = (0..universe).collect();
    values.shuffle(rng);
    values.truncate(rng.gen_range(0..=max_len));
    values
}

fn setup(batch_size: usize) -> (Arc<IdleQueue>, SectionedModel<u32, u32>, Arc<Mirror>) {
    let idle = Arc::new(IdleQueue::new());
    let model = SectionedModel::with_config(
        idle.clone(),
        SectionedModelConfig::new().with_batch_size(batch_size),
    );
    let mirror = Arc::new(Mirror::default());
    model.set_delegate(&mirror);
    (idle, model, mirror)
}

fn assert_converged(model: &SectionedModel<u32, u32>, mirror: &Mirror) {
    assert_eq!(model.real_sections(), model.sections());
    assert_eq!(mirror.sections(), model.sections());
    for section in model.sections() {
        assert_eq!(model.real_items(&section), model.items(&section));
        assert_eq!(mirror.items(section), model.items(&section));
    }
    assert_eq!(model.pending_changes(), 0);
    assert!(!model.is_dispatching());
}

#[test]
fn test_random_updates_converge() {
    let mut rng = StdRng::seed_from_u64(0x9e37_79b9_7f4a_7c15);

    for round in 0..40 {
        let (idle, model, mirror) = setup(rng.gen_range(1..=4));

        for _ in 0..25 {
            match rng.gen_range(0..4) {
                0 => model.set_sections(subset(&mut rng, 6, 5)),
                1 | 2 => {
                    let section = rng.gen_range(0..6);
                    let items = subset(&mut rng, 12, 8);
                    model.set_items(&section, items);
                }
                _ => {
                    for _ in 0..rng.gen_range(0..3) {
                        idle.process_tick();
                    }
                }
            }
        }

        idle.run_until_idle(1_000)
            .unwrap_or_else(|err| panic!("round {round}: {err}"));
        assert_converged(&model, &mirror);

        let transitions = mirror.empty_transitions.lock().clone();
        assert!(
            transitions.windows(2).all(|pair| pair[0] != pair[1]),
            "round {round}: repeated emptiness notification {transitions:?}"
        );
        assert_eq!(transitions.last().copied().unwrap_or(true), model.is_empty());
    }
}

#[test]
fn test_sections_dispatch_before_their_items() {
    let (idle, model, mirror) = setup(10);
    model.set_items(&1, vec![10, 11]);
    model.set_sections(vec![1, 2]);
    model.set_items(&2, vec![20]);
    idle.run_until_idle(10).unwrap();

    assert_eq!(
        *mirror.log.lock(),
        vec!["+s1@0", "+s2@1", "+i10@0/s1", "+i11@1/s1", "+i20@0/s2"]
    );
}

#[test]
fn test_latest_items_supersede_queued_ones() {
    let (idle, model, mirror) = setup(10);
    model.set_sections(vec![1]);
    idle.run_until_idle(10).unwrap();

    model.set_items(&1, vec![1, 2, 3]);
    model.set_items(&1, vec![3, 4]);
    assert_eq!(model.pending_changes(), 2);
    idle.run_until_idle(10).unwrap();

    assert_eq!(mirror.items(1), vec![3, 4]);
    assert_eq!(model.real_items(&1), vec![3, 4]);
}

#[test]
fn test_superseded_midway_converges() {
    let (idle, model, mirror) = setup(2);
    model.set_sections(vec![1]);
    model.set_items(&1, (0..10).collect());
    idle.process_tick();
    idle.process_tick();
    assert!(model.is_dispatching());

    model.set_items(&1, vec![9, 0, 5]);
    idle.run_until_idle(20).unwrap();
    assert_converged(&model, &mirror);
}

#[test]
fn test_relative_order_preserved_across_removal() {
    let (idle, model, mirror) = setup(10);
    model.set_sections(vec![1]);
    model.set_items(&1, vec![1, 2, 3, 4, 5]);
    idle.run_until_idle(10).unwrap();
    mirror.log.lock().clear();

    model.set_items(&1, vec![1, 3, 5]);
    idle.run_until_idle(10).unwrap();

    assert_eq!(*mirror.log.lock(), vec!["-i4@3/s1", "-i2@1/s1"]);
    assert_eq!(mirror.items(1), vec![1, 3, 5]);
}

#[test]
fn test_emptiness_transitions_once_each_way() {
    let (idle, model, mirror) = setup(10);
    model.set_sections(vec![1, 2]);
    model.set_items(&1, vec![1]);
    model.set_items(&2, vec![2]);
    model.set_items(&1, vec![]);
    model.set_items(&2, vec![]);
    model.set_items(&2, vec![]);
    idle.run_until_idle(10).unwrap();

    assert_eq!(*mirror.empty_transitions.lock(), vec![false, true]);
    assert!(model.is_empty());
}

#[test]
fn test_reset_to_nothing() {
    let (idle, model, mirror) = setup(3);
    model.set_sections(vec![1, 2, 3]);
    for section in 1..=3 {
        model.set_items(&section, vec![section * 10, section * 10 + 1]);
    }
    idle.run_until_idle(20).unwrap();

    model.set_sections(vec![]);
    idle.run_until_idle(20).unwrap();

    assert!(mirror.sections().is_empty());
    assert!(model.real_sections().is_empty());
    assert!(model.is_empty());
}

/// Delegate that declares more content from inside a callback.
struct Chaining {
    model: SectionedModel<u32, u32>,
    added: Mutex<Vec<u32>>,
}

impl SectionedModelDelegate<u32, u32> for Chaining {
    fn section_added(&self, section: &u32, _index: usize) {
        self.added.lock().push(*section);
        if *section == 1 {
            self.model.set_items(&1, vec![7, 8]);
            self.model.set_sections(vec![1, 2]);
        }
    }

    fn section_removed(&self, _section: &u32, _index: usize) {}

    fn item_added(&self, _item: &u32, _index: usize, _section: &u32) {}

    fn item_removed(&self, _item: &u32, _index: usize, _section: &u32) {}

    fn is_empty_changed(&self, _is_empty: bool) {}
}

#[test]
fn test_delegate_may_mutate_model_reentrantly() {
    for immediate in [false, true] {
        let idle = Arc::new(IdleQueue::new());
        let model: SectionedModel<u32, u32> = if immediate {
            SectionedModel::new(Arc::new(ImmediateScheduler::new()))
        } else {
            SectionedModel::new(idle.clone())
        };
        let delegate = Arc::new(Chaining {
            model: model.clone(),
            added: Mutex::new(Vec::new()),
        });
        model.set_delegate(&delegate);

        model.set_sections(vec![1]);
        idle.run_until_idle(10).unwrap();

        assert_eq!(*delegate.added.lock(), vec![1, 2]);
        assert_eq!(model.real_sections(), vec![1, 2]);
        assert_eq!(model.real_items(&1), vec![7, 8]);
        assert!(!model.is_dispatching());
    }
}

#[test]
fn test_logging_with_test_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("trellis=trace,trellis_core=trace")
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (idle, model, mirror) = setup(2);
        model.set_sections(vec![1]);
        model.set_items(&1, vec![1, 2, 3]);
        idle.run_until_idle(10).unwrap();
        assert_converged(&model, &mirror);
    });
}
