use serde::Deserialize;
use std::fmt;

/// Axis used to pick the top level destination folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OrderBy {
    #[default]
    Artist,
    Album,
    Year,
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Artist => write!(f, "artist"),
            OrderBy::Album => write!(f, "album"),
            OrderBy::Year => write!(f, "year"),
        }
    }
}

/// MusicBrainz recording as returned by `/ws/2/recording/<id>`
///
/// Lists that are missing from the response deserialize as empty. String
/// fields that are missing or empty are treated as absent by the accessors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub releases: Vec<ReleaseEntry>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// One entry of an artist credit
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArtistCredit {
    /// Name as credited on this recording
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub joinphrase: Option<String>,
    #[serde(default)]
    pub artist: Option<Artist>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReleaseEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: i64,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl RecordingMetadata {
    /// Names of the credited artists, in credit order
    pub fn artist_names(&self) -> Vec<&str> {
        self.artist_credit
            .iter()
            .filter_map(|credit| credit.artist.as_ref())
            .filter_map(|artist| non_empty(&artist.name))
            .collect()
    }

    /// Titles of every release containing this recording
    pub fn release_titles(&self) -> Vec<&str> {
        self.releases
            .iter()
            .filter_map(|release| non_empty(&release.title))
            .collect()
    }

    /// Year part (text before the first `-`) of every dated release
    pub fn release_years(&self) -> Vec<&str> {
        self.releases
            .iter()
            .filter_map(|release| non_empty(&release.date))
            .filter_map(|date| date.split('-').next())
            .collect()
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING_JSON: &str = r#"{
        "id": "b1a9c0e9-d987-4042-ae91-78d6a3267d69",
        "title": "Song",
        "length": 183000,
        "artist-credit": [
            {"name": "Alice", "joinphrase": " & ", "artist": {"id": "a1", "name": "Alice", "sort-name": "Alice"}},
            {"name": "Bobby", "joinphrase": "", "artist": {"id": "b2", "name": "Bob", "sort-name": "Bob"}}
        ],
        "releases": [
            {"id": "r1", "title": "Album", "date": "2020-05-01", "status": "Official"},
            {"id": "r2", "title": "Best Of", "date": "2022"},
            {"id": "r3", "title": "Bootleg", "date": ""},
            {"id": "r4", "title": "Undated"}
        ],
        "tags": [{"name": "rock", "count": 3}]
    }"#;

    #[test]
    fn test_decode_recording() {
        let recording: RecordingMetadata = serde_json::from_str(RECORDING_JSON).unwrap();
        assert_eq!(recording.title(), Some("Song"));
        assert_eq!(recording.artist_credit.len(), 2);
        assert_eq!(recording.releases.len(), 4);
        assert_eq!(recording.tags[0].name, "rock");
    }

    #[test]
    fn test_projections() {
        let recording: RecordingMetadata = serde_json::from_str(RECORDING_JSON).unwrap();
        // artist names come from the artist entity, not the credited name
        assert_eq!(recording.artist_names(), vec!["Alice", "Bob"]);
        assert_eq!(
            recording.release_titles(),
            vec!["Album", "Best Of", "Bootleg", "Undated"]
        );
        assert_eq!(recording.release_years(), vec!["2020", "2022"]);
    }

    #[test]
    fn test_decode_sparse_recording() {
        let recording: RecordingMetadata = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(recording.title(), None);
        assert!(recording.artist_names().is_empty());
        assert!(recording.release_titles().is_empty());
        assert!(recording.release_years().is_empty());
    }

    #[test]
    fn test_empty_title_is_absent() {
        let recording: RecordingMetadata =
            serde_json::from_str(r#"{"id": "x", "title": ""}"#).unwrap();
        assert_eq!(recording.title(), None);
    }
}
