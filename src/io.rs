use crate::availability::AvailabilityStore;
use crate::model::{Assignment, AvailabilityWindow, Employee, EmployeeId, Role, Shift, ShiftId};
use crate::schedule::Schedule;
use crate::scheduler::{UnmetShift, ValidationIssue};
use anyhow::{bail, Context};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import d'employés: header `id,name,roles[,max_hours]`, rôles séparés par `;`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if id.is_empty() || name.is_empty() {
            bail!("invalid employee row (empty)");
        }
        let mut employee = Employee::new(id, name);
        if let Some(roles) = rec.get(2) {
            employee.roles = roles
                .split(';')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(Role::new)
                .collect();
        }
        if let Some(cap) = rec.get(3) {
            let cap = cap.trim();
            if !cap.is_empty() {
                employee.max_hours = Some(
                    cap.parse()
                        .with_context(|| format!("invalid max_hours value for employee {id}"))?,
                );
            }
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import de disponibilités: header `employee,role,start,end`.
/// Un jour nu (`YYYY-MM-DD`) en fin de fenêtre couvre la journée entière.
pub fn import_availability_csv<P: AsRef<Path>>(
    path: P,
    store: &mut AvailabilityStore,
) -> anyhow::Result<usize> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut count = 0usize;
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let employee = EmployeeId::new(rec.get(0).context("missing employee")?.trim());
        let role = Role::new(rec.get(1).context("missing role")?);
        let (start, _) = parse_point(rec.get(2).context("missing start")?.trim())?;
        let (mut end, end_was_date) = parse_point(rec.get(3).context("missing end")?.trim())?;
        if end_was_date {
            end += Duration::days(1);
        }
        let window = AvailabilityWindow::new(role, start, end)
            .with_context(|| format!("availability row {} for {employee}", line + 2))?;
        store
            .insert_window(&employee, window)
            .with_context(|| format!("availability row {} for {employee}", line + 2))?;
        count += 1;
    }
    Ok(count)
}

fn parse_point(raw: &str) -> anyhow::Result<(DateTime<Utc>, bool)> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok((dt, false));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .context("invalid midnight conversion")?;
    Ok((Utc.from_utc_datetime(&datetime), true))
}

/// Import de créneaux: header `name,role,start,end,min_staff[,max_staff]` (RFC3339 UTC)
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Shift>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim().to_string();
        let role = Role::new(rec.get(1).context("missing role")?);
        let start: DateTime<Utc> = rec
            .get(2)
            .context("missing start")?
            .trim()
            .parse()
            .context("start RFC3339")?;
        let end: DateTime<Utc> = rec
            .get(3)
            .context("missing end")?
            .trim()
            .parse()
            .context("end RFC3339")?;
        let min_staff: u32 = rec
            .get(4)
            .context("missing min_staff")?
            .trim()
            .parse()
            .context("min_staff")?;
        let max_staff = match rec.get(5).map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.parse().context("max_staff")?),
            _ => None,
        };
        let s = Shift::new(name.clone(), role, start, end, min_staff, max_staff)
            .with_context(|| format!("shift {name}"))?;
        out.push(s);
    }
    Ok(out)
}

/// Import d'un planning saisi à la main: header `employee,shift` (ids).
pub fn import_schedule_csv<P: AsRef<Path>>(path: P, shifts: &[Shift]) -> anyhow::Result<Schedule> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut assignments = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee = rec.get(0).context("missing employee")?.trim();
        let shift = rec.get(1).context("missing shift")?.trim();
        if employee.is_empty() || shift.is_empty() {
            bail!("invalid schedule row (empty)");
        }
        assignments.push(Assignment::new(EmployeeId::new(employee), ShiftId::new(shift)));
    }
    let schedule = Schedule::new(shifts.to_vec(), assignments)?;
    Ok(schedule)
}

/// Export CSV du planning: header `employee,employee_name,shift,name,role,start,end,minutes`
pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    schedule: &Schedule,
    store: &AvailabilityStore,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "employee",
        "employee_name",
        "shift",
        "name",
        "role",
        "start",
        "end",
        "minutes",
    ])?;
    let mut buf = itoa::Buffer::new();
    for entry in schedule.entries() {
        let display = store
            .employee(entry.employee)
            .map(|e| e.name.as_str())
            .unwrap_or("");
        let start = entry.interval.start.to_rfc3339();
        let end = entry.interval.end.to_rfc3339();
        w.write_record([
            entry.employee.as_str(),
            display,
            entry.shift.id.as_str(),
            entry.shift.name.as_str(),
            entry.shift.role.as_str(),
            start.as_str(),
            end.as_str(),
            buf.format(entry.interval.duration_minutes()),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des disponibilités: header `employee,role,start,end`
pub fn export_availability_csv<P: AsRef<Path>>(
    path: P,
    store: &AvailabilityStore,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["employee", "role", "start", "end"])?;
    for employee in store.employees() {
        for window in &employee.windows {
            let start = window.start.to_rfc3339();
            let end = window.end.to_rfc3339();
            w.write_record([
                employee.id.as_str(),
                window.role.as_str(),
                start.as_str(),
                end.as_str(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des manques et violations: header `kind,shift,employee,detail`
pub fn export_issues_csv<P: AsRef<Path>>(
    path: P,
    unmet: &[UnmetShift],
    issues: &[ValidationIssue],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["kind", "shift", "employee", "detail"])?;
    let mut required = itoa::Buffer::new();
    let mut assigned = itoa::Buffer::new();
    for u in unmet {
        let detail = format!(
            "required {} assigned {}",
            required.format(u.required),
            assigned.format(u.assigned)
        );
        w.write_record(["unmet", u.shift.as_str(), "", detail.as_str()])?;
    }
    for issue in issues {
        w.write_record([
            issue.kind.as_str(),
            issue.shift.as_ref().map(ShiftId::as_str).unwrap_or(""),
            issue.employee.as_ref().map(EmployeeId::as_str).unwrap_or(""),
            issue.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
