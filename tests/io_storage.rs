#![forbid(unsafe_code)]
use chrono::{TimeZone, Utc};
use roulement::{
    generate, io, validate, AvailabilityStore, ConstraintModel, EmployeeId, GlobalRules,
    IssueKind, JsonStorage, ModelError, Role, SaveStore, Storage, Workspace,
};
use std::fs;
use tempfile::tempdir;

const EMPLOYEES: &str = "id,name,roles,max_hours
alice,Alice,Cashier;Stock,
bob,Bob,Cashier,8
";

const AVAILABILITY: &str = "employee,role,start,end
alice,Cashier,2025-03-17T08:00:00Z,2025-03-17T14:00:00Z
bob,Cashier,2025-03-17,2025-03-18
alice,Stock,2025-03-18T09:00:00Z,2025-03-18T13:00:00Z
";

const SHIFTS: &str = "name,role,start,end,min_staff,max_staff
mon-am,Cashier,2025-03-17T09:00:00Z,2025-03-17T13:00:00Z,2,2
mon-pm,Cashier,2025-03-17T13:00:00Z,2025-03-17T17:00:00Z,1,
tue-stock,Stock,2025-03-18T09:00:00Z,2025-03-18T13:00:00Z,1,1
";

fn workspace(dir: &std::path::Path) -> Workspace {
    fs::write(dir.join("employees.csv"), EMPLOYEES).unwrap();
    fs::write(dir.join("availability.csv"), AVAILABILITY).unwrap();
    fs::write(dir.join("shifts.csv"), SHIFTS).unwrap();

    let employees = io::import_employees_csv(dir.join("employees.csv")).unwrap();
    let mut availability = AvailabilityStore::from_employees(employees).unwrap();
    let n = io::import_availability_csv(dir.join("availability.csv"), &mut availability).unwrap();
    assert_eq!(n, 3);
    let shifts = io::import_shifts_csv(dir.join("shifts.csv")).unwrap();
    let constraints = ConstraintModel::new(shifts, GlobalRules::default()).unwrap();
    Workspace {
        availability,
        constraints,
        schedule: None,
    }
}

#[test]
fn csv_imports_build_a_usable_workspace() {
    let dir = tempdir().unwrap();
    let ws = workspace(dir.path());

    let bob = ws.availability.employee(&EmployeeId::new("bob")).unwrap();
    assert_eq!(bob.max_hours, Some(8));
    // un jour nu en fin de fenêtre couvre toute la journée
    let cashier = Role::new("Cashier");
    let bob_windows: Vec<_> = ws
        .availability
        .windows_for(&EmployeeId::new("bob"), &cashier)
        .collect();
    assert_eq!(bob_windows[0].end, Utc.with_ymd_and_hms(2025, 3, 19, 0, 0, 0).unwrap());

    let out = generate(&ws.availability, &ws.constraints).unwrap();
    assert!(out.unmet.is_empty());
    assert_eq!(out.schedule.assignments().len(), 4);
}

#[test]
fn inverted_window_row_is_an_error_not_a_drop() {
    let dir = tempdir().unwrap();
    let mut ws = workspace(dir.path());
    let path = dir.path().join("bad.csv");
    fs::write(
        &path,
        "employee,role,start,end\nalice,Cashier,2025-03-17T14:00:00Z,2025-03-17T09:00:00Z\n",
    )
    .unwrap();
    let err = io::import_availability_csv(&path, &mut ws.availability).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ModelError>(),
        Some(ModelError::InvalidWindow(_))
    ));
}

#[test]
fn inverted_band_row_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(
        &path,
        "name,role,start,end,min_staff,max_staff\nx,Cashier,2025-03-17T09:00:00Z,2025-03-17T13:00:00Z,3,1\n",
    )
    .unwrap();
    let err = io::import_shifts_csv(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ModelError>(),
        Some(ModelError::InvalidShift(_))
    ));
}

#[test]
fn exported_schedule_lists_ordered_triples() {
    let dir = tempdir().unwrap();
    let ws = workspace(dir.path());
    let out = generate(&ws.availability, &ws.constraints).unwrap();

    let path = dir.path().join("schedule.csv");
    io::export_schedule_csv(&path, &out.schedule, &ws.availability).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "employee,employee_name,shift,name,role,start,end,minutes"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("alice,Alice,"));
    assert!(lines[1].ends_with(",mon-am,Cashier,2025-03-17T09:00:00+00:00,2025-03-17T13:00:00+00:00,240"));
    assert!(lines[4].contains(",tue-stock,Stock,"));
}

#[test]
fn hand_edited_schedule_is_validated_like_a_generated_one() {
    let dir = tempdir().unwrap();
    let ws = workspace(dir.path());
    let out = generate(&ws.availability, &ws.constraints).unwrap();
    let stock_id = out
        .schedule
        .entries()
        .find(|e| e.shift.name == "tue-stock")
        .map(|e| e.shift.id.to_string())
        .unwrap();

    let path = dir.path().join("edited.csv");
    fs::write(&path, format!("employee,shift\nbob,{stock_id}\n")).unwrap();
    let edited = io::import_schedule_csv(&path, ws.constraints.shifts()).unwrap();
    let issues = validate(&edited, &ws.constraints, &ws.availability);
    let kinds: Vec<IssueKind> = issues.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&IssueKind::Understaffed));
    assert!(kinds.contains(&IssueKind::UnqualifiedAssignment));
    assert!(kinds.contains(&IssueKind::UnavailableAssignment));

    let report = dir.path().join("issues.csv");
    io::export_issues_csv(&report, &[], &issues).unwrap();
    let text = fs::read_to_string(&report).unwrap();
    assert_eq!(text.lines().count(), issues.len() + 1);
}

#[test]
fn availability_export_round_trips() {
    let dir = tempdir().unwrap();
    let ws = workspace(dir.path());
    let path = dir.path().join("availability-out.csv");
    io::export_availability_csv(&path, &ws.availability).unwrap();

    let employees = ws.availability.employees().iter().map(|e| {
        let mut e = e.clone();
        e.windows.clear();
        e
    });
    let mut reloaded = AvailabilityStore::from_employees(employees.collect()).unwrap();
    io::import_availability_csv(&path, &mut reloaded).unwrap();
    assert_eq!(reloaded, ws.availability);
}

#[test]
fn json_storage_saves_and_reloads() {
    let dir = tempdir().unwrap();
    let mut ws = workspace(dir.path());
    ws.schedule = Some(generate(&ws.availability, &ws.constraints).unwrap().schedule);

    let storage = JsonStorage::open(dir.path().join("planning.json")).unwrap();
    assert!(!storage.exists());
    storage.save(&ws).unwrap();
    let loaded = storage.load().unwrap();
    assert_eq!(loaded, ws);
}

#[test]
fn tampered_workspace_fails_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("planning.json");
    fs::write(
        &path,
        r#"{"constraints":{"shifts":[{"id":"s","name":"s","role":"Cashier",
            "start":"2025-03-17T09:00:00Z","end":"2025-03-17T13:00:00Z",
            "min_staff":3,"max_staff":1}]}}"#,
    )
    .unwrap();
    let storage = JsonStorage::open(&path).unwrap();
    assert!(storage.load().is_err());
}

#[test]
fn snapshots_save_list_load_delete() {
    let dir = tempdir().unwrap();
    let ws = workspace(dir.path());
    let saves = SaveStore::new(dir.path().join("saves"));
    assert!(saves.list().unwrap().is_empty());

    let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2025, 3, 11, 8, 0, 0).unwrap();
    let first = saves.save(&ws, "first draft", t0).unwrap();
    let second = saves.save(&Workspace::default(), "empty", t1).unwrap();
    let again = saves.save(&ws, "same second", t1).unwrap();
    assert_eq!(first.id, "save_20250310_080000");
    assert_eq!(again.id, "save_20250311_080000_2");
    assert_eq!(first.start_date.unwrap().to_string(), "2025-03-17");
    assert_eq!(first.end_date.unwrap().to_string(), "2025-03-18");
    assert!(second.start_date.is_none());

    let listed: Vec<String> = saves.list().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(listed, vec![again.id.clone(), second.id.clone(), first.id.clone()]);

    let (info, restored) = saves.load(&first.id).unwrap();
    assert_eq!(info.description, "first draft");
    assert_eq!(restored, ws);

    saves.delete(&second.id).unwrap();
    assert_eq!(saves.list().unwrap().len(), 2);
    assert!(saves.load("../planning").is_err());
}
