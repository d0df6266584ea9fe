//! Channel-kind classification policy.
//!
//! Recording files carry no channel-kind metadata; the lab convention encodes
//! it in the file name. The policy lives behind a trait so directory loads can
//! swap it out (`read_directory_with`) instead of baking string matching into
//! the loader.

use crate::types::ChannelKind;

/// Maps a recording file name to the kind of signal it holds.
pub trait ChannelClassifier {
    fn classify(&self, file_name: &str) -> ChannelKind;
}

/// Default lab convention: displacement recordings are named after the
/// displacement field ("u…") or the source position ("source…"); everything
/// else is an electric-potential recording.
#[derive(Debug, Clone)]
pub struct PrefixChannelClassifier {
    seismic_prefixes: Vec<String>,
}

impl PrefixChannelClassifier {
    pub fn new(seismic_prefixes: Vec<String>) -> Self {
        Self { seismic_prefixes }
    }
}

impl Default for PrefixChannelClassifier {
    fn default() -> Self {
        Self::new(vec!["u".to_string(), "source".to_string()])
    }
}

impl ChannelClassifier for PrefixChannelClassifier {
    fn classify(&self, file_name: &str) -> ChannelKind {
        if self
            .seismic_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
        {
            ChannelKind::Seismic
        } else {
            ChannelKind::Electric
        }
    }
}
