#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use roulement::{
    io,
    report::{render_report, TextReport},
    scheduler::{GenerateOptions, Scheduler},
    storage::{JsonStorage, SaveStore, Storage, Workspace},
    template::{expand_shifts, load_template_from_file},
    Assignment, EmployeeId, GlobalRules,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des créneaux (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du workspace (disponibilités, créneaux, planning)
    #[arg(long, global = true, default_value = "planning.json")]
    workspace: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des employés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
        /// Met à jour les fiches existantes (nom, rôles, plafond) en gardant
        /// leurs disponibilités
        #[arg(long)]
        update: bool,
    },

    /// Retirer un employé, ses disponibilités et ses affectations
    RemoveEmployee {
        #[arg(long)]
        id: String,
    },

    /// Effacer les disponibilités (d'un employé, ou de tous)
    ClearAvailability {
        #[arg(long)]
        employee: Option<String>,
    },

    /// Importer des disponibilités depuis un CSV
    ImportAvailability {
        #[arg(long)]
        csv: String,
    },

    /// Importer des créneaux depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Remplacer les créneaux par le dépliage d'un template
    ExpandTemplate {
        #[arg(long)]
        template: String,
        /// YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        to: String,
    },

    /// Afficher ou modifier les règles globales
    Rules {
        #[arg(long)]
        max_hours: Option<u32>,
        /// Supprime le plafond d'heures global
        #[arg(long, conflicts_with = "max_hours")]
        no_max_hours: bool,
        #[arg(long)]
        allow_overlap: Option<bool>,
    },

    /// Générer le planning
    Generate {
        /// Complète jusqu'à l'effectif maximal quand c'est sans risque
        #[arg(long)]
        fill_headroom: bool,
        #[arg(long)]
        out_csv: Option<String>,
        /// Export CSV des manques (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Valider le planning courant ou un planning CSV `employee,shift`
    Validate {
        #[arg(long)]
        schedule_csv: Option<String>,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_availability: Option<String>,
    },

    /// Enregistrer un instantané du workspace
    Snapshot {
        #[arg(long, default_value = "saves")]
        dir: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Lister les instantanés
    Snapshots {
        #[arg(long, default_value = "saves")]
        dir: String,
    },

    /// Restaurer un instantané dans le workspace
    Restore {
        #[arg(long, default_value = "saves")]
        dir: String,
        #[arg(long)]
        id: String,
    },

    /// Supprimer un instantané
    DeleteSnapshot {
        #[arg(long, default_value = "saves")]
        dir: String,
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.workspace)?;
    let mut ws = if storage.exists() {
        storage.load()?
    } else {
        Workspace::default()
    };

    let code = match cli.cmd {
        Commands::ImportEmployees { csv, update } => {
            let employees = io::import_employees_csv(csv)?;
            let (mut added, mut updated) = (0, 0);
            for mut employee in employees {
                match ws.availability.employee(&employee.id) {
                    Some(existing) if update => {
                        employee.windows = existing.windows.clone();
                        ws.availability.replace_employee(employee)?;
                        updated += 1;
                    }
                    _ => {
                        ws.availability.insert_employee(employee)?;
                        added += 1;
                    }
                }
            }
            storage.save(&ws)?;
            println!("{added} employee(s) imported, {updated} updated");
            0
        }
        Commands::RemoveEmployee { id } => {
            let id = EmployeeId::new(id);
            let removed = ws.availability.remove_employee(&id)?;
            let mut dropped = 0;
            if let Some(schedule) = &ws.schedule {
                let theirs: Vec<Assignment> = schedule
                    .assignments()
                    .iter()
                    .filter(|a| a.employee == id)
                    .cloned()
                    .collect();
                dropped = theirs.len();
                ws.schedule = Some(schedule.edited(&theirs, Vec::new())?);
            }
            storage.save(&ws)?;
            println!(
                "removed {} ({} window(s), {dropped} assignment(s))",
                removed.id,
                removed.windows.len()
            );
            0
        }
        Commands::ClearAvailability { employee } => {
            let n = match employee {
                Some(id) => ws.availability.clear_windows(&EmployeeId::new(id))?,
                None => ws.availability.clear_all_windows(),
            };
            storage.save(&ws)?;
            println!("{n} window(s) cleared");
            0
        }
        Commands::ImportAvailability { csv } => {
            let n = io::import_availability_csv(csv, &mut ws.availability)?;
            storage.save(&ws)?;
            println!("{n} window(s) imported");
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv)?;
            let n = shifts.len();
            for shift in shifts {
                ws.constraints.add_shift(shift)?;
            }
            ws.schedule = None;
            storage.save(&ws)?;
            println!("{n} shift(s) imported");
            0
        }
        Commands::ExpandTemplate { template, from, to } => {
            let template = load_template_from_file(&template)?;
            let from = parse_date(&from)?;
            let to = parse_date(&to)?;
            let mut model = expand_shifts(&template, from, to)?;
            if template.rules.is_none() {
                model.set_rules(*ws.constraints.rules());
            }
            println!("{} shift(s) from template {}", model.shifts().len(), template.id);
            ws.constraints = model;
            ws.schedule = None;
            storage.save(&ws)?;
            0
        }
        Commands::Rules {
            max_hours,
            no_max_hours,
            allow_overlap,
        } => {
            let mut rules: GlobalRules = *ws.constraints.rules();
            if max_hours.is_some() || no_max_hours || allow_overlap.is_some() {
                if no_max_hours {
                    rules.max_hours_per_employee = None;
                }
                if max_hours.is_some() {
                    rules.max_hours_per_employee = max_hours;
                }
                if let Some(flag) = allow_overlap {
                    rules.allow_overlap = flag;
                }
                ws.constraints.set_rules(rules);
                storage.save(&ws)?;
            }
            println!(
                "max_hours_per_employee: {}",
                rules
                    .max_hours_per_employee
                    .map_or_else(|| "-".to_string(), |h| h.to_string())
            );
            println!("allow_overlap: {}", rules.allow_overlap);
            0
        }
        Commands::Generate {
            fill_headroom,
            out_csv,
            report,
        } => {
            if ws.constraints.shifts().is_empty() {
                bail!("no shifts to staff (import shifts or expand a template first)");
            }
            let generated = Scheduler::new(&ws.availability, &ws.constraints)
                .with_options(GenerateOptions { fill_headroom })
                .generate()?;
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &generated.schedule, &ws.availability)?;
            }
            if let Some(path) = report {
                io::export_issues_csv(path, &generated.unmet, &[])?;
            }
            println!(
                "{} assignment(s), {} unmet shift(s)",
                generated.schedule.assignments().len(),
                generated.unmet.len()
            );
            let text = render_report(&generated.unmet, &[], &ws.constraints, &TextReport);
            eprint!("{text}");
            let complete = generated.is_complete();
            ws.schedule = Some(generated.schedule);
            storage.save(&ws)?;
            // Code 2 = WARNING/INCOMPLETE
            if complete {
                0
            } else {
                2
            }
        }
        Commands::Validate {
            schedule_csv,
            report,
        } => {
            let schedule = match schedule_csv {
                Some(path) => io::import_schedule_csv(path, ws.constraints.shifts())?,
                None => ws
                    .schedule
                    .clone()
                    .context("no schedule in workspace (generate one or pass --schedule-csv)")?,
            };
            let issues = Scheduler::new(&ws.availability, &ws.constraints).validate(&schedule);
            if issues.is_empty() {
                println!("OK: no issues");
                0
            } else {
                eprintln!("Found {} issue(s)", issues.len());
                eprint!("{}", render_report(&[], &issues, &ws.constraints, &TextReport));
                if let Some(path) = report {
                    io::export_issues_csv(path, &[], &issues)?;
                }
                2
            }
        }
        Commands::List {
            out_json,
            out_csv,
            out_availability,
        } => {
            if let Some(path) = out_json {
                std::fs::write(&path, serde_json::to_string_pretty(&ws)?)
                    .with_context(|| format!("writing {path}"))?;
            }
            if let Some(path) = out_availability {
                io::export_availability_csv(path, &ws.availability)?;
            }
            match &ws.schedule {
                Some(schedule) => {
                    if let Some(path) = out_csv {
                        io::export_schedule_csv(path, schedule, &ws.availability)?;
                    }
                    // impression compacte
                    for entry in schedule.entries() {
                        println!(
                            "{} | {} → {} | {} | {}",
                            entry.shift.id.as_str(),
                            entry.interval.start.to_rfc3339(),
                            entry.interval.end.to_rfc3339(),
                            entry.shift.role,
                            entry.employee
                        );
                    }
                }
                None => {
                    for shift in ws.constraints.shifts_ordered_by_start() {
                        println!(
                            "{} | {} → {} | {} | -",
                            shift.id.as_str(),
                            shift.start.to_rfc3339(),
                            shift.end.to_rfc3339(),
                            shift.role
                        );
                    }
                }
            }
            0
        }
        Commands::Snapshot { dir, description } => {
            let info = SaveStore::new(dir).save(&ws, &description, Utc::now())?;
            println!("{}", info.id);
            0
        }
        Commands::Snapshots { dir } => {
            for info in SaveStore::new(dir).list()? {
                println!(
                    "{} | {} | {}",
                    info.id,
                    info.created_at.to_rfc3339(),
                    info.description
                );
            }
            0
        }
        Commands::Restore { dir, id } => {
            let (info, restored) = SaveStore::new(dir).load(&id)?;
            storage.save(&restored)?;
            println!("restored {} ({})", info.id, info.created_at.to_rfc3339());
            0
        }
        Commands::DeleteSnapshot { dir, id } => {
            SaveStore::new(dir).delete(&id)?;
            println!("deleted {id}");
            0
        }
    };

    std::process::exit(code);
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}
