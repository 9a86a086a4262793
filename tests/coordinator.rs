use seesaw_sim::config::SeesawConfig;
use seesaw_sim::persistence::{KeyValueStore, MemoryStore, keys};
use seesaw_sim::sim::{ObjectPhase, Side, SimEvent};
use seesaw_sim::{ManagerError, SeesawManager};

fn fresh() -> SeesawManager<MemoryStore> {
    SeesawManager::new(MemoryStore::new(), SeesawConfig::default(), 1234)
}

fn run_ticks(manager: &mut SeesawManager<MemoryStore>, ticks: usize) {
    for _ in 0..ticks {
        manager.tick();
    }
}

fn active_count(manager: &SeesawManager<MemoryStore>) -> usize {
    manager.seesaws().iter().filter(|s| s.is_active()).count()
}

#[test]
fn test_removing_last_seesaw_fails() {
    let mut manager = fresh();
    assert_eq!(manager.remove_seesaw(0), Err(ManagerError::LastSeesaw));
    assert_eq!(manager.seesaws().len(), 1);
    assert_eq!(manager.active_id(), Some(0));
}

#[test]
fn test_capacity_is_enforced() {
    let mut manager = fresh();
    for expected in 1..10 {
        assert_eq!(manager.add_seesaw(), Ok(expected));
    }
    assert_eq!(manager.seesaws().len(), 10);
    assert!(!manager.can_add());

    assert_eq!(
        manager.add_seesaw(),
        Err(ManagerError::TooManySeesaws { max: 10 })
    );
    assert_eq!(manager.seesaws().len(), 10);
    assert_eq!(manager.active_id(), Some(9));
}

#[test]
fn test_exactly_one_active_after_switching() {
    let mut manager = fresh();
    manager.add_seesaw().unwrap();
    manager.add_seesaw().unwrap();
    assert_eq!(active_count(&manager), 1);

    manager.switch_to(1).unwrap();
    assert_eq!(active_count(&manager), 1);
    assert_eq!(manager.active().map(|s| s.id), Some(1));
    assert_eq!(manager.persistence().active_id(), 1);

    assert_eq!(manager.switch_to(42), Err(ManagerError::NotFound(42)));
    assert_eq!(manager.active_id(), Some(1));
}

#[test]
fn test_drop_land_and_reset_events() {
    let mut manager = fresh();
    let weight = manager.active().map(|s| s.next_weight).unwrap();

    manager.on_pointer_move(100.0, 0.0);
    assert!(manager.view().unwrap().preview.is_some());
    manager.on_click(100.0, 0.0);
    assert!(manager.view().unwrap().preview.is_none());
    run_ticks(&mut manager, 120);

    let events = manager.drain_events();
    assert!(matches!(
        events.as_slice(),
        [
            SimEvent::Dropped { side: Side::Right, .. },
            SimEvent::Landed { side: Side::Right, .. }
        ]
    ));

    let stats = manager.stats().unwrap();
    assert_eq!(stats.right_torque, weight * 100.0);
    assert_eq!(stats.right_weight, weight);
    assert!(stats.angle > 0.0);

    manager.reset_active();
    assert_eq!(manager.drain_events(), vec![SimEvent::Reset]);
    let seesaw = manager.active().unwrap();
    assert!(seesaw.objects.is_empty());
    assert_eq!(seesaw.balance.right_torque, 0.0);
    assert_eq!(seesaw.log.entries().collect::<Vec<_>>(), vec!["Seesaw has been reset"]);
}

#[test]
fn test_only_active_seesaw_advances() {
    let mut manager = fresh();
    manager.on_click(-150.0, 0.0);

    // Switching away lands the falling object at once
    manager.add_seesaw().unwrap();
    let first = manager.get(0).unwrap();
    assert!(first.objects.iter().all(|o| o.torque_applied));
    assert!(first.balance.left_torque > 0.0);
    let paused_angle = first.balance.current_angle;

    run_ticks(&mut manager, 60);
    assert_eq!(manager.get(0).unwrap().balance.current_angle, paused_angle);

    // Back on the first seesaw the plank starts moving again
    manager.switch_to(0).unwrap();
    run_ticks(&mut manager, 60);
    assert!(manager.get(0).unwrap().balance.current_angle < paused_angle);
}

#[test]
fn test_removing_active_switches_and_deletes_state() {
    let mut manager = fresh();
    manager.add_seesaw().unwrap();
    manager.add_seesaw().unwrap();
    assert_eq!(manager.active_id(), Some(2));

    manager.remove_seesaw(2).unwrap();
    assert_eq!(manager.seesaws().len(), 2);
    assert_eq!(manager.active_id(), Some(0));
    assert_eq!(active_count(&manager), 1);

    let config = manager.config().clone();
    assert!(manager.persistence().load_instance(2, &config).is_none());
    assert_eq!(manager.persistence().load_all(&config).len(), 2);
}

#[test]
fn test_state_survives_a_reload() {
    let mut manager = fresh();
    manager.on_click(-120.0, 0.0);
    run_ticks(&mut manager, 120);
    manager.add_seesaw().unwrap();
    manager.on_click(60.0, 0.0);
    run_ticks(&mut manager, 120);
    manager.rename_seesaw(1, "Playground").unwrap();
    manager.set_plank_width(800.0);

    let before: Vec<_> = manager
        .seesaws()
        .iter()
        .map(|s| (s.id, s.balance.left_torque, s.balance.right_torque))
        .collect();
    let store = manager.persistence().store().clone();

    let restored = SeesawManager::new(store, SeesawConfig::default(), 99);
    let after: Vec<_> = restored
        .seesaws()
        .iter()
        .map(|s| (s.id, s.balance.left_torque, s.balance.right_torque))
        .collect();
    assert_eq!(before, after);

    assert_eq!(restored.active_id(), Some(1));
    let active = restored.active().unwrap();
    assert_eq!(active.name, "Playground");
    assert_eq!(active.plank_width, 800.0);
    assert!(active.objects.iter().all(|o| o.phase == ObjectPhase::Settled));
    assert_eq!(
        active.log.entries().next(),
        Some("Restored 2 seesaw(s)")
    );
}

#[test]
fn test_malformed_storage_starts_fresh() {
    let mut store = MemoryStore::new();
    store.set(keys::SEESAWS, "[[[").unwrap();
    store.set(keys::ACTIVE_ID, "-3").unwrap();

    let manager = SeesawManager::new(store, SeesawConfig::default(), 5);
    assert_eq!(manager.seesaws().len(), 1);
    assert_eq!(manager.active_id(), Some(0));
    assert_eq!(manager.persistence().active_id(), 0);
}

#[test]
fn test_unknown_stored_active_id_falls_back_to_first() {
    let mut store = MemoryStore::new();
    store
        .set(keys::SEESAWS, r#"[{"id":3,"name":"A"},{"id":5,"name":"B"}]"#)
        .unwrap();
    store.set(keys::ACTIVE_ID, "7").unwrap();

    let mut manager = SeesawManager::new(store, SeesawConfig::default(), 5);
    assert_eq!(manager.active_id(), Some(3));
    assert_eq!(manager.add_seesaw(), Ok(6));
}

#[test]
fn test_unstorable_id_is_ignored_on_restore() {
    let mut store = MemoryStore::new();
    store.set(keys::SEESAWS, r#"[{"id":4294967295}]"#).unwrap();

    let manager = SeesawManager::new(store, SeesawConfig::default(), 5);
    assert_eq!(manager.seesaws().len(), 1);
    assert_eq!(manager.active_id(), Some(0));
}

#[test]
fn test_add_reports_exhausted_ids() {
    let mut store = MemoryStore::new();
    store.set(keys::SEESAWS, r#"[{"id":4294967294}]"#).unwrap();

    let mut manager = SeesawManager::new(store, SeesawConfig::default(), 5);
    assert_eq!(manager.active_id(), Some(4_294_967_294));
    assert_eq!(
        manager.active().map(|s| s.name.as_str()),
        Some("Seesaw 4294967295")
    );

    assert_eq!(manager.add_seesaw(), Err(ManagerError::IdsExhausted));
    assert_eq!(manager.seesaws().len(), 1);
    assert_eq!(manager.active_id(), Some(4_294_967_294));
}
