use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{Accessor, ItemKey, Tag, TagType};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

static FORBIDDEN_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();
static RELEASE_DATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_forbidden_chars_regex() -> &'static Regex {
    FORBIDDEN_CHARS_REGEX.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap())
}

/// `1997`, `1997-05` or `1997-05-21`
fn get_release_date_regex() -> &'static Regex {
    RELEASE_DATE_REGEX.get_or_init(|| Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$").unwrap())
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("invalid year '{0}': expected YYYY, YYYY-MM or YYYY-MM-DD")]
    InvalidYear(String),

    #[error("failed to read tags from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },

    #[error("{tag_type:?} tags are not supported by {}", path.display())]
    Unsupported { path: PathBuf, tag_type: TagType },

    #[error("failed to write tags to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },

    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Requested changes to a file's tags.
///
/// `None` leaves a field alone, an empty string removes it.
#[derive(Debug, Clone, Default)]
pub struct TagEdit {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

/// A field after validation
#[derive(Debug, PartialEq)]
enum FieldChange<T> {
    Keep,
    Remove,
    Set(T),
}

fn text_change(value: &Option<String>) -> FieldChange<String> {
    match value.as_deref().map(str::trim) {
        None => FieldChange::Keep,
        Some("") => FieldChange::Remove,
        Some(v) => FieldChange::Set(v.to_string()),
    }
}

/// A year or a full release date, stored as the recording date
fn year_change(value: &Option<String>) -> Result<FieldChange<String>, TagError> {
    match text_change(value) {
        FieldChange::Set(v) if !get_release_date_regex().is_match(&v) => {
            Err(TagError::InvalidYear(v))
        }
        change => Ok(change),
    }
}

impl TagEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
            && self.genre.is_none()
    }

    /// Check the edit without touching any file
    pub fn validate(&self) -> Result<(), TagError> {
        year_change(&self.year).map(|_| ())
    }

    /// The title this edit sets, if any
    pub fn new_title(&self) -> Option<&str> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => Some(title),
            _ => None,
        }
    }
}

/// Write `edit` into the file's tag, creating the tag when the file has none
pub fn apply(path: &Path, edit: &TagEdit) -> Result<(), TagError> {
    let year = year_change(&edit.year)?;

    let mut tagged_file = lofty::read_from_path(path).map_err(|source| TagError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        if let Some(tag) = tagged_file.first_tag() {
            tag_type = tag.tag_type();
        } else {
            tag_type = default_tag_type(path);
        }
    }

    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| TagError::Unsupported {
            path: path.to_path_buf(),
            tag_type,
        })?;

    match text_change(&edit.title) {
        FieldChange::Set(v) => tag.set_title(v),
        FieldChange::Remove => tag.remove_title(),
        FieldChange::Keep => {}
    }
    match text_change(&edit.artist) {
        FieldChange::Set(v) => tag.set_artist(v),
        FieldChange::Remove => tag.remove_artist(),
        FieldChange::Keep => {}
    }
    match text_change(&edit.album) {
        FieldChange::Set(v) => tag.set_album(v),
        FieldChange::Remove => tag.remove_album(),
        FieldChange::Keep => {}
    }
    match year {
        FieldChange::Set(v) => {
            // A stale dedicated year item would shadow the new date
            tag.remove_year();
            tag.insert_text(ItemKey::RecordingDate, v);
        }
        FieldChange::Remove => tag.remove_year(),
        FieldChange::Keep => {}
    }
    match text_change(&edit.genre) {
        FieldChange::Set(v) => tag.set_genre(v),
        FieldChange::Remove => tag.remove_genre(),
        FieldChange::Keep => {}
    }

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(|source| TagError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!("Updated {:?} tags in {}", tag_type, path.display());
    Ok(())
}

/// Rename (when requested and the edit sets a title), then write tags.
/// Returns the file's final path. If the tags cannot be written the file
/// gets its old name back.
pub fn edit_track(path: &Path, edit: &TagEdit, rename: bool) -> Result<PathBuf, TagError> {
    edit.validate()?;

    let target = match edit.new_title() {
        Some(title) if rename => rename_to_title(path, title)?,
        _ => path.to_path_buf(),
    };

    if let Err(e) = apply(&target, edit) {
        if target != path {
            match std::fs::rename(&target, path) {
                Ok(()) => tracing::info!("Restored {}", path.display()),
                Err(undo) => tracing::warn!(
                    "Could not restore {} from {}: {}",
                    path.display(),
                    target.display(),
                    undo
                ),
            }
        }
        return Err(e);
    }

    Ok(target)
}

fn default_tag_type(path: &Path) -> TagType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "flac" | "ogg" | "oga" | "opus" => TagType::VorbisComments,
        "mp4" | "m4a" | "m4b" | "aac" => TagType::Mp4Ilst,
        _ => TagType::Id3v2,
    }
}

/// Remove characters that are not allowed in file names
pub fn sanitize_filename(name: &str) -> String {
    get_forbidden_chars_regex()
        .replace_all(name, "")
        .trim()
        .to_string()
}

/// Rename `path` to `<title>.<ext>` next to it.
///
/// The file keeps its name when the sanitized title is empty, when the
/// name would not change, or when the target already exists.
pub fn rename_to_title(path: &Path, title: &str) -> Result<PathBuf, TagError> {
    let stem = sanitize_filename(title);
    if stem.is_empty() {
        return Ok(path.to_path_buf());
    }

    let file_name = match path.extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy().to_lowercase()),
        None => stem,
    };
    let target = path.with_file_name(file_name);

    if target == path {
        return Ok(path.to_path_buf());
    }
    if target.exists() {
        tracing::warn!(
            "Not renaming {}: {} already exists",
            path.display(),
            target.display()
        );
        return Ok(path.to_path_buf());
    }

    std::fs::rename(path, &target).map_err(|source| TagError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    tracing::info!("Renamed {} to {}", path.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::metadata;
    use std::fs;

    /// A tenth of a second of 16-bit mono silence
    fn write_silent_wav(path: &Path) {
        let samples = vec![0u8; 1600];
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(4 + 8 + 16 + 8 + samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // channels
        wav.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
        wav.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(&samples);
        fs::write(path, wav).unwrap();
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("AC/DC: Back in Black?"), "ACDC Back in Black");
        assert_eq!(sanitize_filename(r#"  "Quoted" <name> | a\b*  "#), "Quoted name  ab");
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn test_field_changes() {
        assert_eq!(text_change(&None), FieldChange::Keep);
        assert_eq!(text_change(&Some("  ".into())), FieldChange::Remove);
        assert_eq!(
            text_change(&Some(" Blue ".into())),
            FieldChange::Set("Blue".to_string())
        );
        assert_eq!(
            year_change(&Some("1971".into())).unwrap(),
            FieldChange::Set("1971".to_string())
        );
        assert_eq!(
            year_change(&Some(" 1997-05-21 ".into())).unwrap(),
            FieldChange::Set("1997-05-21".to_string())
        );
        assert_eq!(year_change(&Some("".into())).unwrap(), FieldChange::Remove);
        for bad in ["seventies", "71", "1997/05/21", "1997-5"] {
            assert!(matches!(
                year_change(&Some(bad.into())),
                Err(TagError::InvalidYear(_))
            ));
        }
    }

    #[test]
    fn test_new_title() {
        let edit = TagEdit {
            title: Some("  ".into()),
            ..TagEdit::default()
        };
        assert_eq!(edit.new_title(), None);
        assert!(!edit.is_empty());
        assert!(TagEdit::default().is_empty());
    }

    #[test]
    fn test_default_tag_type() {
        assert_eq!(default_tag_type(Path::new("a.FLAC")), TagType::VorbisComments);
        assert_eq!(default_tag_type(Path::new("a.opus")), TagType::VorbisComments);
        assert_eq!(default_tag_type(Path::new("a.m4a")), TagType::Mp4Ilst);
        assert_eq!(default_tag_type(Path::new("a.mp3")), TagType::Id3v2);
        assert_eq!(default_tag_type(Path::new("a.unknown")), TagType::Id3v2);
    }

    #[test]
    fn test_rename_to_title() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("track01.MP3");
        fs::write(&original, b"").unwrap();

        let renamed = rename_to_title(&original, "Song: Two").unwrap();
        assert_eq!(renamed, dir.path().join("Song Two.mp3"));
        assert!(renamed.exists());
        assert!(!original.exists());

        // Same name again is a no-op
        assert_eq!(rename_to_title(&renamed, "Song Two").unwrap(), renamed);
    }

    #[test]
    fn test_rename_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.flac");
        let taken = dir.path().join("Taken.flac");
        fs::write(&first, b"first").unwrap();
        fs::write(&taken, b"taken").unwrap();

        assert_eq!(rename_to_title(&first, "Taken").unwrap(), first);
        assert_eq!(fs::read(&taken).unwrap(), b"taken");
        assert_eq!(rename_to_title(&first, "***").unwrap(), first);
    }

    #[test]
    fn test_edit_track_rejects_bad_year_before_renaming() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.flac");
        fs::write(&original, b"").unwrap();

        let edit = TagEdit {
            title: Some("New".into()),
            year: Some("soon".into()),
            ..TagEdit::default()
        };
        assert!(matches!(
            edit_track(&original, &edit, true),
            Err(TagError::InvalidYear(_))
        ));
        assert!(original.exists());
    }

    #[test]
    fn test_apply_sets_then_removes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_silent_wav(&path);

        let edit = TagEdit {
            title: Some("Blue".into()),
            artist: Some("Joni Mitchell".into()),
            album: Some("Blue".into()),
            year: Some("1971-06-22".into()),
            genre: Some("Folk".into()),
        };
        apply(&path, &edit).unwrap();

        let track = metadata::extract(&path).unwrap();
        assert_eq!(track.title, "Blue");
        assert_eq!(track.artist, "Joni Mitchell");
        assert_eq!(track.album, "Blue");
        assert_eq!(track.year, Some(1971));
        assert_eq!(track.genre, "Folk");

        let edit = TagEdit {
            artist: Some("".into()),
            year: Some("".into()),
            ..TagEdit::default()
        };
        apply(&path, &edit).unwrap();

        let track = metadata::extract(&path).unwrap();
        assert_eq!(track.title, "Blue");
        assert_eq!(track.artist, "");
        assert_eq!(track.year, None);
        assert_eq!(track.genre, "Folk");
    }

    #[test]
    fn test_edit_track_renames_then_tags() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("track01.wav");
        write_silent_wav(&original);

        let edit = TagEdit {
            title: Some("River".into()),
            ..TagEdit::default()
        };
        let path = edit_track(&original, &edit, true).unwrap();

        assert_eq!(path, dir.path().join("River.wav"));
        assert!(!original.exists());
        assert_eq!(metadata::extract(&path).unwrap().title, "River");
    }

    #[test]
    fn test_failed_write_restores_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.flac");
        fs::write(&original, b"not audio").unwrap();

        let edit = TagEdit {
            title: Some("New".into()),
            ..TagEdit::default()
        };
        assert!(edit_track(&original, &edit, true).is_err());
        assert!(original.exists());
        assert!(!dir.path().join("New.flac").exists());
        assert_eq!(fs::read(&original).unwrap(), b"not audio");
    }
}
