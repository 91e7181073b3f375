//! Explicit bind, unbind and device list operations through the service

use std::collections::BTreeMap;
use std::sync::Arc;

use openracing_bindings::{Action, AxisIndex, BindRequest, Gear, HShifterRequest, SequentialRequest};
use openracing_errors::{BinderError, ConfigurationError, ConflictError, DeviceError};
use openracing_input_source::{DeviceDescriptor, InputSource, ScriptedDevice, ScriptedSource};
use racing_wheel_binder::{
    AppContext, BinderConfig, JsonStateStore, MemoryStateStore, RecentSelection, StateStore,
};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn rig() -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(vec![
        ScriptedDevice::new(DeviceDescriptor::new("{AAA-1}", "Wheel Base").with_product_guid("{P-1}")),
        ScriptedDevice::new(DeviceDescriptor::new("{BBB-2}", "Load Cell Pedals").with_product_guid("{P-2}")),
        ScriptedDevice::new(DeviceDescriptor::new("{CCC-3}", "alpha shifter").with_product_guid("{P-3}")),
    ]))
}

async fn context(store: Arc<dyn StateStore>) -> AppContext {
    AppContext::new(BinderConfig::default(), rig(), store).await
}

#[tokio::test]
async fn test_bind_updates_summary_and_saves() -> TestResult {
    let store = Arc::new(MemoryStateStore::new());
    let ctx = context(Arc::clone(&store) as Arc<dyn StateStore>).await;
    let service = ctx.bindings();

    let bound = service.bind(&BindRequest::axis("throttle", 1, 2)).await?;
    assert_eq!(bound.action, Action::Throttle);
    assert_eq!(store.save_count(), 1);

    let summary = service.summary();
    let throttle = summary
        .actions
        .iter()
        .find(|a| a.action == "THROTTLE")
        .ok_or("THROTTLE missing from summary")?;
    assert_eq!(throttle.controller_index, Some(1));
    assert_eq!(throttle.axis, Some(2));
    assert_eq!(throttle.button, None);

    let saved = store.saved().ok_or("nothing saved")?;
    assert_eq!(saved.controls.throttle.binding(), Some((1, AxisIndex::new(1))));
    Ok(())
}

#[tokio::test]
async fn test_rejected_bind_does_not_save() {
    let store = Arc::new(MemoryStateStore::new());
    let ctx = context(Arc::clone(&store) as Arc<dyn StateStore>).await;
    let service = ctx.bindings();

    let wrong_kind = service.bind(&BindRequest::button("STEER", 0, 3)).await;
    assert!(matches!(
        wrong_kind,
        Err(BinderError::Configuration(ConfigurationError::WrongInputKind { .. }))
    ));
    let negative = service.bind(&BindRequest::axis("STEER", -1, 1)).await;
    assert!(matches!(
        negative,
        Err(BinderError::Configuration(ConfigurationError::BadIndex { .. }))
    ));

    assert_eq!(store.save_count(), 0);
    assert!(!ctx.controls_snapshot().steer.is_bound());
}

#[tokio::test]
async fn test_use_devices_sorts_and_remaps_output() -> TestResult {
    let ctx = context(Arc::new(MemoryStateStore::new())).await;
    let service = ctx.bindings();

    assert_eq!(service.use_devices().await?, 3);
    service.bind(&BindRequest::axis("THROTTLE", 2, 2)).await?;

    let names: Vec<String> = service.summary().devices.into_iter().map(|d| d.name).collect();
    assert_eq!(names, ["alpha shifter", "Load Cell Pedals", "Wheel Base"]);

    let text = service.export_text();
    assert!(text.contains("[CONTROLLERS]\nCON0=alpha shifter\n__IGUID0=CCC-3\nPGUID0=P-3\n"));
    assert!(text.contains("[THROTTLE]\nJOY=0\nAXLE=1\n"));
    Ok(())
}

#[tokio::test]
async fn test_device_in_use_cannot_be_removed() -> TestResult {
    let store = Arc::new(MemoryStateStore::new());
    let ctx = context(Arc::clone(&store) as Arc<dyn StateStore>).await;
    let service = ctx.bindings();

    service.use_devices().await?;
    service.bind(&BindRequest::button("GEARUP", 0, 4)).await?;
    let saves = store.save_count();

    assert!(matches!(
        service.remove_device("AAA-1").await,
        Err(BinderError::Conflict(ConflictError::DeviceInUse(_)))
    ));
    assert!(matches!(
        service.remove_all_devices().await,
        Err(BinderError::Conflict(ConflictError::DeviceInUse(_)))
    ));
    assert!(matches!(
        service.remove_device("{ZZZ-9}").await,
        Err(BinderError::Device(DeviceError::NotFound(_)))
    ));
    assert_eq!(store.save_count(), saves);

    let removed = service.remove_device("{bbb-2}").await?;
    assert_eq!(removed.name(), "Load Cell Pedals");
    assert_eq!(ctx.controls_snapshot().devices.len(), 2);

    service.unbind("GEARUP").await?;
    assert_eq!(service.remove_all_devices().await?, 2);
    assert!(ctx.controls_snapshot().devices.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unbind_targets() -> TestResult {
    let ctx = context(Arc::new(MemoryStateStore::new())).await;
    let service = ctx.bindings();

    service.bind(&BindRequest::axis("THROTTLE", 0, 1)).await?;
    let gears = BTreeMap::from([("GEAR_1".to_string(), 8), ("GEAR_R".to_string(), 14)]);
    let assigned = service
        .bind_h_shifter(&HShifterRequest {
            controller_index: 2,
            gears,
        })
        .await?;
    assert_eq!(assigned, 2);
    assert!(ctx.controls_snapshot().shifter.is_active());

    assert!(service.unbind("shifter").await?);
    let controls = ctx.controls_snapshot();
    assert!(!controls.shifter.is_active());
    assert_eq!(controls.shifter.gear_button(Gear::First), None);

    assert!(matches!(
        service.unbind("NITRO").await,
        Err(BinderError::Configuration(ConfigurationError::UnknownAction(_)))
    ));

    assert_eq!(service.unbind_binding("THROTTLE_1").await?, Action::Throttle);
    assert!(!ctx.controls_snapshot().throttle.is_bound());
    assert!(!service.unbind("THROTTLE").await?);
    Ok(())
}

#[tokio::test]
async fn test_sequential_then_unbind_all() -> TestResult {
    let store = Arc::new(MemoryStateStore::new());
    let ctx = context(Arc::clone(&store) as Arc<dyn StateStore>).await;
    let service = ctx.bindings();

    service
        .bind_sequential(&SequentialRequest {
            controller_index: 1,
            gear_up: Some(5),
            gear_down: Some(4),
        })
        .await?;
    let controls = ctx.controls_snapshot();
    assert_eq!(controls.gear_up.binding(), Some((1, 5)));
    assert_eq!(controls.gear_down.binding(), Some((1, 4)));

    service.unbind_all().await;
    let controls = ctx.controls_snapshot();
    assert!(!controls.gear_up.is_bound());
    assert!(!controls.gear_down.is_bound());
    assert_eq!(store.save_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_export_import_round_trip() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("controls.ini");

    let first = context(Arc::new(MemoryStateStore::new())).await;
    let service = first.bindings();
    service.use_devices().await?;
    service.bind(&BindRequest::axis("STEER", 0, 1)).await?;
    service.bind(&BindRequest::button("CAMERA", 1, 7)).await?;
    service.export_to(&path)?;

    let store = Arc::new(MemoryStateStore::new());
    let second = context(Arc::clone(&store) as Arc<dyn StateStore>).await;
    second.bindings().import_from(&path).await?;

    assert_eq!(second.bindings().export_text(), service.export_text());
    assert_eq!(store.save_count(), 1);

    let missing = second.bindings().import_from(&dir.path().join("absent.ini")).await;
    assert!(missing.is_err());
    Ok(())
}

#[tokio::test]
async fn test_state_file_restores_bindings() -> TestResult {
    let dir = TempDir::new()?;
    let state_file = dir.path().join("state.json");

    let first = context(Arc::new(JsonStateStore::new(&state_file))).await;
    first.bindings().bind(&BindRequest::axis("BRAKES", 1, 3)).await?;
    first
        .persistence
        .set_recent(RecentSelection {
            last_car: Some("ks_mazda_mx5_cup".to_string()),
            last_track: None,
            last_nick: Some("driver".to_string()),
        })
        .await;
    assert!(state_file.exists());

    let second = context(Arc::new(JsonStateStore::new(&state_file))).await;
    assert_eq!(
        second.controls_snapshot().brakes.binding(),
        Some((1, AxisIndex::new(2)))
    );
    let recent = second.persistence.recent();
    assert_eq!(recent.last_car.as_deref(), Some("ks_mazda_mx5_cup"));
    assert_eq!(recent.last_nick.as_deref(), Some("driver"));
    Ok(())
}
