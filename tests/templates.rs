#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use roulement::{
    expand_shifts, export_template_json, load_template_from_file, GlobalRules, Role, ShiftId, Slot,
    Template,
};
use tempfile::tempdir;

#[test]
fn export_and_load_template_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("freelancer.json");
    let template = sample_template();
    export_template_json(&path, &template).unwrap();

    let loaded = load_template_from_file(&path).unwrap();
    assert_eq!(loaded.id, template.id);
    assert_eq!(loaded.slots.len(), template.slots.len());
    assert_eq!(loaded.rules, template.rules);
}

#[test]
fn expand_weekday_and_weekend_slots() {
    let template = sample_template();
    let from = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(); // vendredi
    let to = NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(); // lundi

    let model = expand_shifts(&template, from, to).unwrap();
    // ven + lun : early, day, night ; sam + dim : early, night
    assert_eq!(model.shifts().len(), 10);
    assert_eq!(model.rules().max_hours_per_employee, Some(40));

    let night = model
        .shift(&ShiftId::new("Freelancer-night-2025-03-21"))
        .unwrap();
    assert_eq!(night.start, Utc.with_ymd_and_hms(2025, 3, 21, 15, 0, 0).unwrap());
    assert_eq!(night.end, Utc.with_ymd_and_hms(2025, 3, 22, 0, 0, 0).unwrap());
    assert_eq!((night.min_staff, night.max_staff), (2, 3));

    let day = model
        .shift(&ShiftId::new("Freelancer-day-2025-03-24"))
        .unwrap();
    assert_eq!(day.start, Utc.with_ymd_and_hms(2025, 3, 24, 9, 30, 0).unwrap());
    assert_eq!(day.max_staff, 1);

    for window in model.shifts().windows(2) {
        if let [a, b] = window {
            assert!(a.start <= b.start);
        }
    }
}

#[test]
fn expansion_ids_are_stable() {
    let template = sample_template();
    let from = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 3, 23).unwrap();
    let a = expand_shifts(&template, from, to).unwrap();
    let b = expand_shifts(&template, from, to).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_templates_are_rejected() {
    let mut template = sample_template();
    template.slots[0].days = vec![0];
    assert!(template.validate().is_err());

    let mut template = sample_template();
    template.slots[0].max_staff = Some(0);
    assert!(template.validate().is_err());

    let template = sample_template();
    let from = NaiveDate::from_ymd_opt(2025, 3, 24).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
    assert!(expand_shifts(&template, from, to).is_err());
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn sample_template() -> Template {
    let role = Role::new("Freelancer");
    Template {
        id: "freelancer".into(),
        name: "Freelancer rota".into(),
        description: Some("early / day / night".into()),
        slots: vec![
            Slot {
                role: role.clone(),
                name: "early".into(),
                start_time: time(7, 0),
                end_time: time(16, 0),
                days: vec![1, 2, 3, 4, 5, 6, 7],
                min_staff: 1,
                max_staff: None,
            },
            Slot {
                role: role.clone(),
                name: "day".into(),
                start_time: time(9, 30),
                end_time: time(18, 30),
                days: vec![1, 2, 3, 4, 5],
                min_staff: 1,
                max_staff: None,
            },
            Slot {
                role,
                name: "night".into(),
                start_time: time(15, 0),
                end_time: time(0, 0),
                days: vec![1, 2, 3, 4, 5, 6, 7],
                min_staff: 2,
                max_staff: Some(3),
            },
        ],
        rules: Some(GlobalRules {
            max_hours_per_employee: Some(40),
            allow_overlap: false,
        }),
    }
}
