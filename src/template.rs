//! Règles par rôle : créneaux types par jour de semaine et effectifs,
//! dépliés en `ConstraintModel` sur une période.

use crate::constraints::{ConstraintModel, GlobalRules};
use crate::model::{Role, Shift, ShiftId};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Description complète d'un template de créneaux.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub rules: Option<GlobalRules>,
}

impl Template {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("template id cannot be empty");
        }
        if self.name.trim().is_empty() {
            bail!("template name cannot be empty");
        }
        if self.slots.is_empty() {
            bail!("template must contain at least one slot");
        }
        let mut names = HashSet::new();
        for slot in &self.slots {
            slot.validate()?;
            if !names.insert((slot.role.as_str(), slot.name.as_str())) {
                bail!("duplicate slot {} for role {}", slot.name, slot.role);
            }
        }
        Ok(())
    }
}

/// Créneau type : `days` en ISO (1 = lundi … 7 = dimanche).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub role: Role,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days: Vec<u8>,
    #[serde(default = "one")]
    pub min_staff: u32,
    #[serde(default)]
    pub max_staff: Option<u32>,
}

fn one() -> u32 {
    1
}

impl Slot {
    fn validate(&self) -> Result<()> {
        if self.role.as_str().is_empty() {
            bail!("slot role cannot be empty");
        }
        if self.days.is_empty() {
            bail!("slot {} must define at least one day", self.name);
        }
        if let Some(day) = self.days.iter().find(|d| !(1..=7).contains(*d)) {
            bail!("slot {}: day {day} is not an ISO weekday (1-7)", self.name);
        }
        if self.start_time == self.end_time {
            bail!("slot {}: start_time and end_time cannot be equal", self.name);
        }
        if let Some(max) = self.max_staff {
            if max < self.min_staff {
                bail!("slot {}: max_staff {max} below min_staff {}", self.name, self.min_staff);
            }
        }
        Ok(())
    }
}

/// Déplie le template jour par jour sur `[from, to]` (bornes incluses).
/// Les identifiants sont dérivés du rôle, du slot et de la date, donc
/// stables d'un dépliage à l'autre.
pub fn expand_shifts(template: &Template, from: NaiveDate, to: NaiveDate) -> Result<ConstraintModel> {
    template.validate()?;
    if to < from {
        bail!("end date must be after start date");
    }

    let mut shifts = Vec::new();
    let mut current = from;

    while current <= to {
        let weekday = current.weekday().number_from_monday() as u8;

        for slot in template.slots.iter().filter(|s| s.days.contains(&weekday)) {
            let (start_dt, end_dt) = build_datetimes(current, slot.start_time, slot.end_time)?;
            let shift = Shift::new(
                format!("{} {} {}", slot.role, slot.name, current),
                slot.role.clone(),
                start_dt,
                end_dt,
                slot.min_staff,
                slot.max_staff,
            )?
            .with_id(ShiftId::new(format!("{}-{}-{}", slot.role, slot.name, current)));
            shifts.push(shift);
        }
        current = current.succ_opt().context("date overflow")?;
    }

    shifts.sort_by_key(|s| s.start);
    let model = ConstraintModel::new(shifts, template.rules.unwrap_or_default())?;
    Ok(model)
}

pub fn export_template_json<P: AsRef<Path>>(path: P, template: &Template) -> Result<()> {
    let json = serde_json::to_string_pretty(template)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_template_from_file<P: AsRef<Path>>(path: P) -> Result<Template> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading template {}", path.display()))?;
    let template: Template = serde_json::from_slice(&data)
        .with_context(|| format!("parsing template {}", path.display()))?;
    template.validate()?;
    Ok(template)
}

/// Une fin antérieure ou égale au début bascule au lendemain (ex. 15:00 → 00:00).
fn build_datetimes(
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start_dt = Utc.from_utc_datetime(&NaiveDateTime::new(date, start_time));
    let mut end_date = date;
    if end_time <= start_time {
        end_date = end_date.succ_opt().context("date overflow")?;
    }
    let end_dt = Utc.from_utc_datetime(&NaiveDateTime::new(end_date, end_time));
    Ok((start_dt, end_dt))
}
