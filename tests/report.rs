#![forbid(unsafe_code)]
use chrono::{TimeZone, Utc};
use roulement::{
    generate, render_report, validate, Assignment, AvailabilityStore, AvailabilityWindow,
    ConstraintModel, Employee, EmployeeId, GlobalRules, Role, Schedule, Shift, ShiftId,
    TextReport,
};

#[test]
fn text_report_lists_unmet_then_issues() {
    let cashier = Role::new("Cashier");
    let at = |h| Utc.with_ymd_and_hms(2025, 3, 17, h, 0, 0).unwrap();

    let mut alice = Employee::new("alice", "Alice").with_role(cashier.clone());
    alice
        .windows
        .push(AvailabilityWindow::new(cashier.clone(), at(9), at(16)).unwrap());
    let avail = AvailabilityStore::from_employees(vec![alice]).unwrap();

    let shifts = vec![
        Shift::new("early".into(), cashier.clone(), at(9), at(13), 1, None)
            .unwrap()
            .with_id(ShiftId::new("early")),
        Shift::new("late".into(), cashier, at(12), at(16), 1, None)
            .unwrap()
            .with_id(ShiftId::new("late")),
    ];
    let constraints = ConstraintModel::new(shifts.clone(), GlobalRules::default()).unwrap();

    let out = generate(&avail, &constraints).unwrap();
    assert_eq!(render_report(&[], &[], &constraints, &TextReport), "");

    let doubled = Schedule::new(
        shifts,
        vec![
            Assignment::new(EmployeeId::new("alice"), ShiftId::new("early")),
            Assignment::new(EmployeeId::new("alice"), ShiftId::new("late")),
        ],
    )
    .unwrap();
    let issues = validate(&doubled, &constraints, &avail);

    let text = render_report(&out.unmet, &issues, &constraints, &TextReport);
    insta::assert_snapshot!(text.trim_end(), @r###"
    Warning: late (2025-03-17 12:00) is understaffed. Required: 1, Assigned: 0.
    [double-booking] alice is double-booked: early overlaps late
    "###);
}
