//! Integration tests for the sectioned view and controller.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Label(String);

fn controller(idle: &Arc<IdleQueue>) -> SectionedController<&'static str, u32, Label> {
    SectionedController::with_config(
        idle.clone(),
        SectionedModelConfig::new().with_batch_size(4),
        |item: &u32| Label(format!("item {item}")),
        |builder| {
            builder
                .header(|section: &&'static str| Some(Label(format!("== {section} =="))))
                .container_kind(|section: &&'static str| match *section {
                    "photos" => ContainerKind::Flow,
                    _ => ContainerKind::List,
                })
        },
    )
}

fn labels(items: &[u32]) -> Vec<Label> {
    items
        .iter()
        .map(|item| Label(format!("item {item}")))
        .collect()
}

#[test]
fn test_view_tracks_model_through_updates() {
    let idle = Arc::new(IdleQueue::new());
    let controller = controller(&idle);
    let view = controller.view();

    controller.set_sections(vec!["recent", "photos"]);
    controller.set_items(&"recent", vec![1, 2, 3]);
    controller.set_items(&"photos", (10..19).collect());

    idle.process_tick();
    assert!(view.section_count() <= 2);
    idle.run_until_idle(50).unwrap();

    assert_eq!(view.displayed_sections(), vec!["recent", "photos"]);
    assert_eq!(view.widgets(&"recent"), labels(&[1, 2, 3]));
    assert_eq!(view.widgets(&"photos"), labels(&(10..19).collect::<Vec<_>>()));
    assert_eq!(
        view.header(&"photos"),
        Some(Label("== photos ==".to_string()))
    );
    assert_eq!(
        view.with_container(&"photos", |container| container.kind()),
        Some(ContainerKind::Flow)
    );

    controller.set_sections(vec!["photos", "archive"]);
    controller.set_items(&"photos", vec![18, 10]);
    controller.set_items(&"archive", vec![99]);
    idle.run_until_idle(50).unwrap();

    assert_eq!(view.displayed_sections(), vec!["photos", "archive"]);
    assert_eq!(view.widgets(&"photos"), labels(&[18, 10]));
    assert_eq!(view.widgets(&"archive"), labels(&[99]));
    assert!(view.widgets(&"recent").is_empty());
}

#[test]
fn test_flow_container_wraps_children() {
    let idle = Arc::new(IdleQueue::new());
    let controller = controller(&idle);
    controller.set_sections(vec!["photos"]);
    controller.set_items(&"photos", (0..6).collect());
    idle.run_until_idle(50).unwrap();

    let cells = controller
        .view()
        .with_container(&"photos", |container| match container {
            SectionContainer::Flow(flow) => Some((flow.line_count(), flow.cell_of(5))),
            SectionContainer::List(_) => None,
        })
        .flatten();
    assert_eq!(cells, Some((2, Some((1, 1)))));
}

#[test]
fn test_activation_reports_declared_coordinates() {
    let idle = Arc::new(IdleQueue::new());
    let controller = controller(&idle);
    controller.set_sections(vec!["a", "b"]);
    controller.set_items(&"b", vec![1, 2, 3]);
    idle.run_until_idle(50).unwrap();

    let activations = Arc::new(Mutex::new(Vec::new()));
    let activations_clone = activations.clone();
    controller.on_activate_index(move |section, item| {
        activations_clone.lock().push((section, item));
    });

    // Declared state moves ahead of what is displayed.
    controller.set_sections(vec!["b"]);
    controller.set_items(&"b", vec![3, 1]);

    // Displayed row 2 of "b" is item 3, now declared at index 0.
    let activation = controller.view().activate(&"b", 2).unwrap();
    assert_eq!(activation.item, 3);
    assert_eq!((activation.section_index, activation.item_index), (0, 0));

    // Displayed row 1 is item 2, which is pending removal.
    assert!(controller.view().activate(&"b", 1).is_none());

    // Section "a" is still displayed but no longer declared.
    assert!(controller.view().activate_at(0, 0).is_none());

    assert_eq!(*activations.lock(), vec![(0, 0)]);

    idle.run_until_idle(50).unwrap();
    assert_eq!(controller.view().widgets(&"b"), labels(&[3, 1]));
}

#[test]
fn test_placeholder_tracks_emptiness() {
    let idle = Arc::new(IdleQueue::new());
    let controller = controller(&idle);
    let empties = Arc::new(Mutex::new(Vec::new()));
    let empties_clone = empties.clone();
    controller
        .model()
        .signals()
        .is_empty_changed
        .connect(move |&empty| empties_clone.lock().push(empty));

    assert!(controller.view().shows_placeholder());
    controller.set_sections(vec!["a"]);
    controller.set_items(&"a", vec![1]);
    assert!(!controller.view().shows_placeholder());

    controller.set_items(&"a", vec![]);
    assert!(controller.view().shows_placeholder());
    assert_eq!(*empties.lock(), vec![false, true]);
}

#[test]
fn test_dropping_controller_stops_dispatch() {
    let idle = Arc::new(IdleQueue::new());
    let controller = controller(&idle);
    controller.set_sections(vec!["a"]);
    controller.set_items(&"a", (0..100).collect());
    drop(controller);

    assert_eq!(idle.run_until_idle(5), Ok(1));
}
