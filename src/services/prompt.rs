use std::io::{BufRead, BufReader, Write};

use crate::playlist::PlaylistMetadata;

/// What to do with a playlist document that points at an existing remote playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportChoice {
    /// Follow the original playlist.
    Follow,
    /// Create a new playlist with the same tracks.
    Copy,
}

impl ImportChoice {
    /// `1` follows, anything else copies.
    pub fn from_input(input: &str) -> Self {
        if input.trim() == "1" {
            ImportChoice::Follow
        } else {
            ImportChoice::Copy
        }
    }
}

/// Asks the user how to import a playlist that still exists remotely.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImportPrompt: Send + Sync {
    async fn choose(&self, metadata: &PlaylistMetadata) -> ImportChoice;
}

/// Prompts on the terminal.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(
        metadata: &PlaylistMetadata,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> std::io::Result<ImportChoice> {
        let owner = match (&metadata.owner_id, metadata.is_third_party) {
            (Some(owner), true) => format!(" by {owner}"),
            _ => String::new(),
        };
        writeln!(output, "Playlist \"{}\"{owner} still exists on Spotify.", metadata.name)?;
        writeln!(output, "  1) Follow the original playlist")?;
        writeln!(output, "  2) Create a copy")?;
        write!(output, "Choice [1/2]: ")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(ImportChoice::from_input(&line))
    }

    /// Runs [`Self::ask`] on the blocking pool so a slow answer never stalls the runtime.
    async fn ask_blocking<R, W>(
        metadata: &PlaylistMetadata,
        mut input: R,
        mut output: W,
    ) -> std::io::Result<ImportChoice>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let metadata = metadata.clone();
        tokio::task::spawn_blocking(move || Self::ask(&metadata, &mut input, &mut output))
            .await
            .map_err(std::io::Error::other)?
    }
}

#[async_trait::async_trait]
impl ImportPrompt for TerminalPrompt {
    async fn choose(&self, metadata: &PlaylistMetadata) -> ImportChoice {
        Self::ask_blocking(metadata, BufReader::new(std::io::stdin()), std::io::stdout())
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(error = %error, "Could not read answer, creating a copy");
                ImportChoice::Copy
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_from_input() {
        assert_eq!(ImportChoice::from_input("1"), ImportChoice::Follow);
        assert_eq!(ImportChoice::from_input(" 1\n"), ImportChoice::Follow);
        assert_eq!(ImportChoice::from_input("2"), ImportChoice::Copy);
        assert_eq!(ImportChoice::from_input(""), ImportChoice::Copy);
        assert_eq!(ImportChoice::from_input("follow"), ImportChoice::Copy);
    }

    #[test]
    fn test_terminal_prompt_reads_answer() {
        let mut metadata = PlaylistMetadata::playlist("Road Trip");
        metadata.owner_id = Some("friend".into());
        metadata.is_third_party = true;

        let mut output = Vec::new();
        let choice = TerminalPrompt::ask(&metadata, &mut "1\n".as_bytes(), &mut output).unwrap();
        assert_eq!(choice, ImportChoice::Follow);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("\"Road Trip\" by friend"));

        let choice =
            TerminalPrompt::ask(&metadata, &mut "".as_bytes(), &mut Vec::new()).unwrap();
        assert_eq!(choice, ImportChoice::Copy);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_answer_is_read_on_the_blocking_pool() {
        let metadata = PlaylistMetadata::playlist("Road Trip");

        let choice = TerminalPrompt::ask_blocking(&metadata, "1\n".as_bytes(), std::io::sink())
            .await
            .unwrap();
        assert_eq!(choice, ImportChoice::Follow);

        let choice = TerminalPrompt::ask_blocking(&metadata, "2\n".as_bytes(), std::io::sink())
            .await
            .unwrap();
        assert_eq!(choice, ImportChoice::Copy);
    }
}
