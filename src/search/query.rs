use crate::library::metadata::Track;

const COVER_SUFFIX: &str = "album cover";

/// The parts of a track that identify its album art
#[derive(Debug, Clone, Default)]
pub struct CoverQuery {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
}

impl CoverQuery {
    pub fn from_track(track: &Track) -> Self {
        Self {
            title: track.display_title(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track.year.map(|y| y.to_string()).unwrap_or_default(),
        }
    }

    /// Search text: the non-empty fields joined by spaces, then the cover suffix
    pub fn to_query_string(&self) -> String {
        let parts: Vec<&str> = [&self.title, &self.artist, &self.album, &self.year]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            return COVER_SUFFIX.to_string();
        }
        format!("{} {}", parts.join(" "), COVER_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_query_string_joins_present_fields() {
        let query = CoverQuery {
            title: "Paranoid Android".into(),
            artist: "Radiohead".into(),
            album: String::new(),
            year: "1997".into(),
        };
        assert_eq!(
            query.to_query_string(),
            "Paranoid Android Radiohead 1997 album cover"
        );
    }

    #[test]
    fn test_query_string_without_fields() {
        assert_eq!(CoverQuery::default().to_query_string(), "album cover");
    }

    #[test]
    fn test_from_track_uses_file_stem_for_missing_title() {
        let track = Track {
            path: PathBuf::from("/music/01 Airbag.flac"),
            artist: "Radiohead".into(),
            album: "OK Computer".into(),
            year: Some(1997),
            ..Track::default()
        };

        assert_eq!(
            CoverQuery::from_track(&track).to_query_string(),
            "01 Airbag Radiohead OK Computer 1997 album cover"
        );
    }
}
