//! Saved-logo persistence: one JSON file, write-through on every mutation.

use crate::model::{GeneratedLogo, LogoId};
use anyhow::{Context, Result};
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};

const SAVED_FILE: &str = "saved_logos.json";

/// Default data directory: `<platform data dir>/logo-studio`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logo-studio")
}

/// Durable collection of saved logos backed by a single JSON file.
///
/// Mutations mirror to disk synchronously. The in-memory list is the source
/// of truth; a failed write leaves it intact and surfaces the error.
pub struct SavedLogoStore {
    path: PathBuf,
    logos: Vec<GeneratedLogo>,
}

impl SavedLogoStore {
    /// Open the store at the given data directory, loading any previously
    /// saved collection. A missing, unreadable, or corrupted file yields an
    /// empty collection rather than an error.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(SAVED_FILE);
        let logos = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { path, logos }
    }

    pub fn logos(&self) -> &[GeneratedLogo] {
        &self.logos
    }

    pub fn get(&self, id: LogoId) -> Option<&GeneratedLogo> {
        self.logos.iter().find(|l| l.id == id)
    }

    /// Save a logo. No-op if an entry with the same prompt text already
    /// exists: prompt identity is what users perceive as "the same logo".
    pub fn save(&mut self, logo: GeneratedLogo) -> Result<()> {
        if self.is_saved(&logo) {
            return Ok(());
        }
        self.logos.push(logo);
        self.persist()
    }

    /// Delete by id, also removing any duplicate rows sharing the victim's
    /// prompt text. Unknown ids are a no-op.
    pub fn delete(&mut self, id: LogoId) -> Result<()> {
        let Some(victim) = self.get(id) else {
            return Ok(());
        };
        let prompt = victim.prompt.clone();
        self.logos.retain(|l| l.id != id && l.prompt != prompt);
        self.persist()
    }

    pub fn is_saved(&self, logo: &GeneratedLogo) -> bool {
        self.logos.iter().any(|l| l.prompt == logo.prompt)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.logos)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write saved logos to {}", self.path.display()))
    }
}

/// Write a logo's PNG into `dir` under its download filename and return the
/// full path. The `data:image/png;base64,` prefix of `image_data` is
/// stripped before decoding, so raw base64 payloads also work.
pub fn write_png(logo: &GeneratedLogo, dir: &Path) -> Result<PathBuf> {
    let payload = logo
        .image_data
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(&logo.image_data);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode logo image data")?;
    let path = dir.join(logo.download_filename());
    fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logo(id: u64, prompt: &str, style: &str) -> GeneratedLogo {
        GeneratedLogo {
            id: LogoId(id),
            prompt: prompt.into(),
            style: style.into(),
            // "PNG" base64-encoded; content is irrelevant to the store.
            image_data: "data:image/png;base64,UE5H".into(),
            created_utc: String::new(),
        }
    }

    #[test]
    fn roundtrips_across_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = SavedLogoStore::open(dir.path());
        store.save(logo(1, "a blue star", "Minimalist")).unwrap();
        store.save(logo(2, "a gold crest", "Classic")).unwrap();

        let store = SavedLogoStore::open(dir.path());
        assert_eq!(store.logos().len(), 2);
        assert_eq!(store.logos()[1].style, "Classic");
    }

    #[test]
    fn save_is_idempotent_by_prompt() {
        let dir = TempDir::new().unwrap();
        let mut store = SavedLogoStore::open(dir.path());
        store.save(logo(1, "a blue star", "Minimalist")).unwrap();
        // Different id, same prompt text: still the same logo to the user.
        store.save(logo(2, "a blue star", "Minimalist")).unwrap();
        assert_eq!(store.logos().len(), 1);
        assert_eq!(store.logos()[0].id, LogoId(1));
    }

    #[test]
    fn delete_unknown_id_leaves_collection_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = SavedLogoStore::open(dir.path());
        store.save(logo(1, "a blue star", "Minimalist")).unwrap();
        store.delete(LogoId(99)).unwrap();
        assert_eq!(store.logos().len(), 1);
    }

    #[test]
    fn delete_removes_entry_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = SavedLogoStore::open(dir.path());
        store.save(logo(1, "a blue star", "Minimalist")).unwrap();
        store.save(logo(2, "a gold crest", "Classic")).unwrap();
        store.delete(LogoId(1)).unwrap();
        assert_eq!(store.logos().len(), 1);

        let store = SavedLogoStore::open(dir.path());
        assert_eq!(store.logos().len(), 1);
        assert_eq!(store.logos()[0].prompt, "a gold crest");
    }

    #[test]
    fn corrupted_file_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SAVED_FILE), "{not json!").unwrap();
        let store = SavedLogoStore::open(dir.path());
        assert!(store.logos().is_empty());
    }

    #[test]
    fn write_png_strips_data_uri_prefix() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&logo(1, "p", "Bold  Retro"), dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "logo-bold-retro.png"
        );
        assert_eq!(fs::read(path).unwrap(), b"PNG");
    }
}
