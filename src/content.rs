use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/data");

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

pub fn quotes() -> Result<Vec<Quote>> {
    read_json("quotes.json")
}

pub fn greetings() -> Result<Vec<String>> {
    read_json("greetings.json")
}

/// Name stems for the simulated leaderboard.
pub fn bot_names() -> Result<Vec<String>> {
    read_json("bots.json")
}

fn read_json<T: DeserializeOwned>(file_name: &str) -> Result<T> {
    let text = DATA_DIR
        .get_file(file_name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| Error::Content(file_name.to_string()))?;
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn embedded_lists_are_populated() {
        assert_eq!(quotes().unwrap().len(), 6);
        assert_eq!(greetings().unwrap().len(), 9);
        assert!(!bot_names().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert_matches!(
            read_json::<Vec<String>>("nope.json"),
            Err(Error::Content(name)) if name == "nope.json"
        );
    }
}
