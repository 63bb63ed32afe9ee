use crate::availability::AvailabilityStore;
use crate::constraints::ConstraintModel;
use crate::schedule::Schedule;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Tout ce qu'il faut pour une période : disponibilités, contraintes,
/// dernier planning retenu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub availability: AvailabilityStore,
    #[serde(default)]
    pub constraints: ConstraintModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl Workspace {
    /// Bornes de la période couverte par les créneaux.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        let shifts = self.constraints.shifts();
        let start = shifts.iter().map(|s| s.start).min()?;
        let end = shifts.iter().map(|s| s.end).max()?;
        Some((start.date_naive(), end.date_naive()))
    }
}

pub trait Storage {
    /// Charge un workspace depuis un support.
    fn load(&self) -> anyhow::Result<Workspace>;
    /// Sauvegarde de manière atomique.
    fn save(&self, workspace: &Workspace) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Workspace> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let workspace: Workspace = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(workspace)
    }

    fn save(&self, workspace: &Workspace) -> anyhow::Result<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(workspace)?)?;
        tracing::info!(path = %self.path.display(), "workspace saved");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}

/// Métadonnées d'une sauvegarde nommée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    metadata: SaveInfo,
    workspace: Workspace,
}

/// Instantanés horodatés d'un workspace dans un répertoire.
#[derive(Debug, Clone)]
pub struct SaveStore {
    base_dir: PathBuf,
}

impl SaveStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, id: &str) -> anyhow::Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            bail!("invalid save id: {id}");
        }
        Ok(self.base_dir.join(format!("{id}.json")))
    }

    pub fn save(
        &self,
        workspace: &Workspace,
        description: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<SaveInfo> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating save directory {}", self.base_dir.display()))?;

        let stem = format!("save_{}", now.format("%Y%m%d_%H%M%S"));
        let mut id = stem.clone();
        let mut n = 1;
        while self.path_for(&id)?.exists() {
            n += 1;
            id = format!("{stem}_{n}");
        }

        let period = workspace.period();
        let metadata = SaveInfo {
            id: id.clone(),
            created_at: now,
            description: description.to_string(),
            start_date: period.map(|(s, _)| s),
            end_date: period.map(|(_, e)| e),
        };
        let file = SaveFile {
            metadata: metadata.clone(),
            workspace: workspace.clone(),
        };
        write_atomic(&self.path_for(&id)?, &serde_json::to_vec_pretty(&file)?)?;
        tracing::info!(id = %id, "snapshot saved");
        Ok(metadata)
    }

    /// Sauvegardes du plus récent au plus ancien ; les fichiers illisibles
    /// sont ignorés avec un avertissement.
    pub fn list(&self) -> anyhow::Result<Vec<SaveInfo>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let is_save = path.extension().and_then(|s| s.to_str()) == Some("json")
                && path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .is_some_and(|n| n.starts_with("save_"));
            if !is_save {
                continue;
            }
            match fs::read(&path)
                .map_err(anyhow::Error::from)
                .and_then(|data| Ok(serde_json::from_slice::<SaveFile>(&data)?))
            {
                Ok(file) => infos.push(file.metadata),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "could not read snapshot");
                }
            }
        }
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(infos)
    }

    pub fn load(&self, id: &str) -> anyhow::Result<(SaveInfo, Workspace)> {
        let path = self.path_for(id)?;
        let data = fs::read(&path).with_context(|| format!("reading snapshot {}", path.display()))?;
        let file: SaveFile = serde_json::from_slice(&data)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok((file.metadata, file.workspace))
    }

    pub fn delete(&self, id: &str) -> anyhow::Result<()> {
        let path = self.path_for(id)?;
        fs::remove_file(&path).with_context(|| format!("deleting snapshot {}", path.display()))?;
        Ok(())
    }
}
