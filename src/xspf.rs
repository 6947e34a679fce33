//! Reading and writing XSPF playlist documents.
//!
//! Metadata that XSPF has no element for (visibility, collaborative flag,
//! playlist kind, owner) is kept in an `<extension>` block tagged with this
//! application's identifier, so exported files can be imported without loss.

use std::io::Write;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::playlist::{
    OFFICIAL_OWNER_ID, Playlist, PlaylistKind, PlaylistMetadata, TrackRecord, UNKNOWN_TITLE,
};

pub const XSPF_NAMESPACE: &str = "http://xspf.org/ns/0/";
/// `application` attribute identifying our extension block.
pub const EXTENSION_APPLICATION: &str = "https://github.com/debfx/spotify-playlists";

#[derive(Debug, thiserror::Error)]
pub enum XspfError {
    #[error("Invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Invalid XML attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Document root is <{0}>, expected <playlist>")]
    UnexpectedRoot(String),
    #[error("Document has no root element")]
    Empty,
    #[error("Playlist document has no <title>")]
    MissingTitle,
}

fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn parse_bool(text: Option<&str>) -> bool {
    text.is_some_and(|text| text.trim().eq_ignore_ascii_case("true"))
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), XspfError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_extension<W: Write>(
    writer: &mut Writer<W>,
    metadata: &PlaylistMetadata,
) -> Result<(), XspfError> {
    let saved_tracks = metadata.kind == PlaylistKind::SavedTracks;

    writer.write_event(Event::Start(
        BytesStart::new("extension").with_attributes([("application", EXTENSION_APPLICATION)]),
    ))?;
    write_text_element(
        writer,
        "public",
        bool_token(metadata.is_public && !saved_tracks),
    )?;
    write_text_element(
        writer,
        "collaborative",
        bool_token(metadata.is_collaborative && !saved_tracks),
    )?;
    write_text_element(writer, "type", metadata.kind.as_str())?;
    if let Some(owner_id) = &metadata.owner_id {
        write_text_element(writer, "owner_id", owner_id)?;
        write_text_element(writer, "is_official", bool_token(metadata.is_official))?;
    }
    writer.write_event(Event::End(BytesEnd::new("extension")))?;
    Ok(())
}

/// Serializes a playlist to an XSPF document.
pub fn render(playlist: &Playlist) -> Result<Vec<u8>, XspfError> {
    let metadata = &playlist.metadata;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("playlist").with_attributes([("version", "1"), ("xmlns", XSPF_NAMESPACE)]),
    ))?;

    write_text_element(&mut writer, "title", &metadata.name)?;
    if metadata.kind == PlaylistKind::Playlist {
        if let Some(location) = &metadata.location_uri {
            write_text_element(&mut writer, "location", location)?;
        }
    }
    write_extension(&mut writer, metadata)?;

    writer.write_event(Event::Start(BytesStart::new("trackList")))?;
    for track in &playlist.tracks {
        writer.write_event(Event::Start(BytesStart::new("track")))?;
        write_text_element(&mut writer, "title", track.title())?;
        write_text_element(&mut writer, "creator", &track.creator())?;
        write_text_element(&mut writer, "location", track.uri())?;
        writer.write_event(Event::End(BytesEnd::new("track")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("trackList")))?;
    writer.write_event(Event::End(BytesEnd::new("playlist")))?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}

#[derive(Default)]
struct ExtensionFields {
    public: Option<String>,
    collaborative: Option<String>,
    kind: Option<String>,
    owner_id: Option<String>,
    is_official: Option<String>,
}

#[derive(Default)]
struct TrackFields {
    title: Option<String>,
    creator: Option<String>,
    location: Option<String>,
}

impl TrackFields {
    fn into_record(self) -> TrackRecord {
        TrackRecord::new(
            self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            self.creator
                .as_deref()
                .map(TrackRecord::artists_from_creator)
                .unwrap_or_default(),
            self.location.unwrap_or_default(),
        )
    }
}

#[derive(Default)]
struct ParseState {
    /// Local names of the currently open elements.
    path: Vec<String>,
    /// Text collected since the innermost element was opened.
    text: String,
    title: Option<String>,
    location: Option<String>,
    /// Set while inside an extension block that belongs to us.
    in_extension: bool,
    extension: ExtensionFields,
    track: Option<TrackFields>,
    tracks: Vec<TrackRecord>,
}

impl ParseState {
    fn parent_path(&self) -> String {
        self.path.join("/")
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), XspfError> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();

        if self.path.is_empty() && name != "playlist" {
            return Err(XspfError::UnexpectedRoot(name));
        }

        match (self.parent_path().as_str(), name.as_str()) {
            ("playlist", "extension") => {
                let application = element
                    .try_get_attribute("application")?
                    .map(|attribute| attribute.unescape_value().map(|value| value.into_owned()))
                    .transpose()?;
                self.in_extension = application.as_deref() == Some(EXTENSION_APPLICATION);
            }
            ("playlist/trackList", "track") => self.track = Some(TrackFields::default()),
            _ => {}
        }

        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn close(&mut self) {
        // Names keep their whitespace; tokens and locations are trimmed.
        let text = std::mem::take(&mut self.text);
        let Some(name) = self.path.pop() else {
            return;
        };

        match (self.parent_path().as_str(), name.as_str()) {
            ("playlist", "title") => self.title = Some(text),
            ("playlist", "location") => self.location = Some(text.trim().to_string()),
            ("playlist", "extension") => self.in_extension = false,
            ("playlist/extension", field) if self.in_extension => {
                match field {
                    "public" => self.extension.public = Some(text.trim().to_string()),
                    "collaborative" => self.extension.collaborative = Some(text.trim().to_string()),
                    "type" => self.extension.kind = Some(text.trim().to_string()),
                    "owner_id" => self.extension.owner_id = Some(text),
                    "is_official" => self.extension.is_official = Some(text.trim().to_string()),
                    _ => {}
                }
            }
            ("playlist/trackList", "track") => {
                if let Some(track) = self.track.take() {
                    self.tracks.push(track.into_record());
                }
            }
            ("playlist/trackList/track", field) => {
                if let Some(track) = self.track.as_mut() {
                    match field {
                        "title" => track.title = Some(text),
                        "creator" => track.creator = Some(text),
                        "location" => track.location = Some(text.trim().to_string()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<Playlist, XspfError> {
        let name = self.title.ok_or(XspfError::MissingTitle)?;
        let extension = self.extension;

        let kind = match extension.kind.as_deref() {
            None => PlaylistKind::Playlist,
            Some(token) => PlaylistKind::from_token(token).unwrap_or_else(|| {
                tracing::warn!(%token, playlist = %name, "Unknown playlist type, treating as a regular playlist");
                PlaylistKind::Playlist
            }),
        };
        let saved_tracks = kind == PlaylistKind::SavedTracks;
        let owner_id = extension.owner_id.filter(|owner| !owner.trim().is_empty());

        let metadata = PlaylistMetadata {
            name,
            kind,
            location_uri: self
                .location
                .filter(|location| !location.is_empty() && !saved_tracks),
            is_public: !saved_tracks && parse_bool(extension.public.as_deref()),
            is_collaborative: !saved_tracks && parse_bool(extension.collaborative.as_deref()),
            is_official: parse_bool(extension.is_official.as_deref())
                || owner_id.as_deref() == Some(OFFICIAL_OWNER_ID),
            owner_id,
            // Depends on who imports the document; the importer fills it in.
            is_third_party: false,
        };

        Ok(Playlist::new(metadata, self.tracks))
    }
}

/// Parses an XSPF document.
///
/// Only the `<location>` of each track identifies it; titles and creators are
/// carried along for display.
pub fn parse(document: &[u8]) -> Result<Playlist, XspfError> {
    let mut reader = Reader::from_reader(document);

    let mut state = ParseState::default();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                state.open(&element)?;
                seen_root = true;
            }
            Event::Empty(element) => {
                state.open(&element)?;
                state.close();
                seen_root = true;
            }
            Event::End(_) => state.close(),
            Event::Text(text) => state.text.push_str(&text.unescape()?),
            Event::CData(data) => state.text.push_str(&String::from_utf8_lossy(&data)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(XspfError::Empty);
    }

    state.finish()
}
