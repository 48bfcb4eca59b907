//! Lyrics scraper.
//!
//! Walks an artist's song-list page, fetches every song page, and writes the
//! lyrics to `<root>/<artist>/<title>.txt`, producing the directory the
//! corpus loader consumes.

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const SONG_ITEM_SELECTOR: &str = r#"ul[class*="ListSection"] li[class*="ListItem__Container"]"#;
const LYRICS_SELECTOR: &str = r#"div[data-lyrics-container="true"]"#;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// A song entry from the artist's song list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLink {
    pub url: String,
    pub title: String,
}

/// Blocking client for an artist's lyrics pages.
#[derive(Debug, Clone)]
pub struct GeniusClient {
    url: String,
    artist: String,
    root: PathBuf,
    http: Client,
}

impl GeniusClient {
    /// `url` is the artist's song-list page; the artist name is lower-cased.
    #[must_use]
    pub fn new(url: impl Into<String>, artist: &str) -> Self {
        Self {
            url: url.into(),
            artist: artist.to_lowercase(),
            root: PathBuf::from("lyrics"),
            http: Client::new(),
        }
    }

    /// Directory under which per-artist folders are created (default `lyrics`).
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    #[must_use]
    pub fn artist(&self) -> &str {
        &self.artist
    }

    #[must_use]
    pub fn artist_dir(&self) -> PathBuf {
        self.root.join(&self.artist)
    }

    /// Whether the artist directory holds at least one scraped `.txt` file.
    #[must_use]
    pub fn has_existing_lyrics(&self) -> bool {
        let Ok(entries) = fs::read_dir(self.artist_dir()) else {
            return false;
        };
        entries
            .filter_map(Result::ok)
            .any(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
    }

    /// Scrape every song and write one `.txt` per title.
    ///
    /// Returns the number of files written.
    pub fn run(&self) -> ScrapeResult<usize> {
        let songs = parse_song_list(&self.fetch(&self.url)?)?;
        info!(artist = %self.artist, songs = songs.len(), "found songs");

        let dir = self.artist_dir();
        fs::create_dir_all(&dir)?;

        let mut written = 0;
        for (i, song) in songs.iter().enumerate() {
            let lyrics = parse_lyrics(&self.fetch(&song.url)?)?;
            if lyrics.is_empty() {
                warn!(url = %song.url, "no lyrics found");
            }
            let name = if song.title.is_empty() {
                format!("untitled_{i}")
            } else {
                song.title.clone()
            };
            write_song(&dir, &name, &lyrics)?;
            written += 1;
        }
        Ok(written)
    }

    fn fetch(&self, url: &str) -> ScrapeResult<String> {
        debug!(url, "GET");
        let body = self.http.get(url).send()?.error_for_status()?.text()?;
        Ok(body)
    }
}

fn write_song(dir: &Path, title: &str, lyrics: &str) -> ScrapeResult<()> {
    fs::write(dir.join(format!("{title}.txt")), lyrics)?;
    Ok(())
}

fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Extract song links and sanitized titles from a song-list page.
pub fn parse_song_list(html: &str) -> ScrapeResult<Vec<SongLink>> {
    let doc = Html::parse_document(html);
    let items = selector(SONG_ITEM_SELECTOR)?;
    let anchor = selector("a[href]")?;

    let songs = doc
        .select(&items)
        .filter_map(|item| {
            let url = item.select(&anchor).next()?.value().attr("href")?;
            let text: String = item.text().collect();
            Some(SongLink {
                url: url.to_string(),
                title: sanitize_title(text.trim()),
            })
        })
        .collect();
    Ok(songs)
}

/// Extract lyrics: every text node of every lyrics container, trimmed, with
/// blank nodes dropped, one per line.
pub fn parse_lyrics(html: &str) -> ScrapeResult<String> {
    let doc = Html::parse_document(html);
    let containers = selector(LYRICS_SELECTOR)?;

    let lines: Vec<&str> = doc
        .select(&containers)
        .flat_map(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    Ok(lines.join("\n"))
}

/// File-safe title: spaces become `_`, lower-case, ASCII punctuation other
/// than `_` removed.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .flat_map(char::to_lowercase)
        .filter(|&c| c == '_' || !c.is_ascii_punctuation())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONG_LIST: &str = r#"
        <html><body>
          <ul class="ListSectiondesktop__Items-sc-53xokv-8 kbIuNQ">
            <li class="ListItem__Container-sc-122yj9e-0 eRBVjI">
              <a href="https://example.com/song-one">Don't Stop (Live)</a>
            </li>
            <li class="ListItem__Container-sc-122yj9e-0 eRBVjI">
              <a href="https://example.com/song-two">Night Drive</a>
            </li>
            <li class="ListItem__Container-sc-122yj9e-0 eRBVjI">no link here</li>
          </ul>
          <ul class="Other"><li><a href="/ignored">Ignored</a></li></ul>
        </body></html>"#;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Don't Stop (Live)"), "dont_stop_live");
        assert_eq!(sanitize_title("already_snake"), "already_snake");
        assert_eq!(sanitize_title("Hey, You!"), "hey_you");
    }

    #[test]
    fn test_parse_song_list() {
        let songs = parse_song_list(SONG_LIST).expect("parse");
        assert_eq!(
            songs,
            vec![
                SongLink {
                    url: "https://example.com/song-one".to_string(),
                    title: "dont_stop_live".to_string(),
                },
                SongLink {
                    url: "https://example.com/song-two".to_string(),
                    title: "night_drive".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_lyrics() {
        let html = r#"
            <div data-lyrics-container="true">First line<br/>  Second line  <br/></div>
            <div>not lyrics</div>
            <div data-lyrics-container="true"><i>Third</i> line</div>"#;
        let lyrics = parse_lyrics(html).expect("parse");
        assert_eq!(lyrics, "First line\nSecond line\nThird\nline");
    }

    #[test]
    fn test_artist_dir_and_existing_lyrics() {
        let root = tempfile::tempdir().expect("tempdir");
        let client = GeniusClient::new("https://example.com", "Tempesst").with_root(root.path());
        assert_eq!(client.artist(), "tempesst");
        assert_eq!(client.artist_dir(), root.path().join("tempesst"));
        assert!(!client.has_existing_lyrics());

        fs::create_dir_all(client.artist_dir()).expect("mkdir");
        assert!(!client.has_existing_lyrics(), "empty directory counts as no lyrics");

        fs::write(client.artist_dir().join("cover.jpg"), "img").expect("write");
        assert!(!client.has_existing_lyrics());

        write_song(&client.artist_dir(), "night_drive", "la la").expect("write");
        assert!(client.has_existing_lyrics());
    }

    #[test]
    fn test_failed_scrape_leaves_no_artist_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let client = GeniusClient::new("http://127.0.0.1:1/songs", "Tempesst").with_root(root.path());

        assert!(matches!(client.run(), Err(ScrapeError::Http(_))));
        assert!(!client.artist_dir().exists());
        assert!(!client.has_existing_lyrics());
    }

    #[test]
    fn test_write_song() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_song(dir.path(), "night_drive", "la la").expect("write");
        let content = fs::read_to_string(dir.path().join("night_drive.txt")).expect("read");
        assert_eq!(content, "la la");
    }
}
