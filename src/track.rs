use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use lofty::file::AudioFile;
use lofty::probe::Probe;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    error::{AppError, Result},
    models::track_model::TrackModel,
};

/// Music tracks are `.mp3`, sound effects are `.wav`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SoundKind {
    Song,
    Sfx,
}

impl SoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKind::Song => "song",
            SoundKind::Sfx => "sfx",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SoundKind::Song => "mp3",
            SoundKind::Sfx => "wav",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(SoundKind::Song),
            "wav" => Some(SoundKind::Sfx),
            _ => None,
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "song" => Ok(SoundKind::Song),
            "sfx" => Ok(SoundKind::Sfx),
            other => Err(format!("unknown sound kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub kind: SoundKind,
}

impl Track {
    /// Playback reference, e.g. `GASTRONOMICA.mp3`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.title, self.kind.extension())
    }
}

impl TryFrom<TrackModel> for Track {
    type Error = AppError;

    fn try_from(value: TrackModel) -> Result<Self> {
        let id = Uuid::from_str(&value.id)
            .map_err(|e| AppError::Database(sqlx::Error::Decode(Box::new(e))))?;
        let kind = SoundKind::from_str(&value.kind)
            .map_err(|e| AppError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Self {
            id,
            title: value.title,
            kind,
        })
    }
}

/// An audio file found on disk.
#[derive(Debug, Clone)]
pub struct Sound {
    pub kind: SoundKind,
    pub name: String,
    pub path: PathBuf,
    pub duration_str: Option<String>,
}

impl Sound {
    pub fn new(kind: SoundKind, path: PathBuf) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        let duration_str = read_duration(&path).map(format_duration);

        Some(Self {
            kind,
            name,
            path,
            duration_str,
        })
    }
}

/// Recursively collects every `.mp3` and `.wav` under `dir`.
pub fn scan_sounds(dir: &Path) -> Result<Vec<Sound>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "sounds directory does not exist");
        return Ok(vec![]);
    }

    let mut sounds = vec![];
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if let Some(kind) = SoundKind::from_path(&path) {
            if let Some(sound) = Sound::new(kind, path) {
                sounds.push(sound);
            }
        }
    }

    sounds.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));

    return Ok(sounds);
}

fn read_duration(path: &Path) -> Option<Duration> {
    let tagged = Probe::open(path).and_then(|probe| probe.read());
    match tagged {
        Ok(file) => Some(file.properties().duration()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read audio properties");
            None
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
