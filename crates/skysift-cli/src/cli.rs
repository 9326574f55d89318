//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use skysift_core::{EmbedKind, SearchCriteria, SortOrder, Timestamp, TriState};

/// Search Bluesky posts through a Skysift index.
#[derive(Parser, Debug)]
#[command(name = "skysift", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SKYSIFT_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a search and print the matching posts
    Search(SearchArgs),
    /// Print the compiled request without sending it
    Query(SearchArgs),
    /// List the languages the index has seen
    Langs,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key (e.g. `client.index_url`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Search filters shared by `search` and `query`.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Free text to search for
    pub text: Vec<String>,

    /// Language to search the text in (repeatable)
    #[arg(short, long = "lang")]
    pub languages: Vec<String>,

    /// Hashtag, with or without `#` (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Author DID (repeatable)
    #[arg(short, long = "author")]
    pub authors: Vec<String>,

    /// newest, oldest or relevance
    #[arg(short, long, default_value = "newest")]
    pub sort: SortOrder,

    /// Only posts before this time (RFC 3339, date, or local datetime)
    #[arg(long)]
    pub before: Option<Timestamp>,

    /// Only posts after this time (RFC 3339, date, or local datetime)
    #[arg(long)]
    pub after: Option<Timestamp>,

    /// Replies: yes, no or any
    #[arg(long, default_value = "any")]
    pub reply: TriState,

    /// Has any label: yes, no or any
    #[arg(long, default_value = "any")]
    pub has_label: TriState,

    /// Has any tag: yes, no or any
    #[arg(long, default_value = "any")]
    pub has_tag: TriState,

    /// Has an embed: yes, no or any
    #[arg(long, default_value = "any")]
    pub has_embed: TriState,

    /// Failed to index cleanly: yes, no or any
    #[arg(long, default_value = "any")]
    pub has_error: TriState,

    /// Require this label (repeatable)
    #[arg(long = "include-label")]
    pub include_labels: Vec<String>,

    /// Exclude this label (repeatable)
    #[arg(long = "exclude-label")]
    pub exclude_labels: Vec<String>,

    /// Do not exclude the known moderation labels by default
    #[arg(long)]
    pub show_labelled: bool,

    /// Embed type: image, video, external, record, recordWithMedia (repeatable)
    #[arg(short, long = "embed")]
    pub embeds: Vec<EmbedKind>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// The free text as one string.
    pub fn text(&self) -> String {
        self.text.join(" ")
    }

    /// Build criteria from the flags.
    ///
    /// `default_languages` apply when no `--lang` was given. Known labels are
    /// excluded when `exclude_known` is set and `--show-labelled` was not,
    /// except for labels explicitly required with `--include-label`.
    pub fn to_criteria(&self, default_languages: &[String], exclude_known: bool) -> SearchCriteria {
        let languages = if self.languages.is_empty() {
            default_languages
        } else {
            &self.languages
        };

        let mut criteria = SearchCriteria::new()
            .with_text(self.text())
            .with_languages(languages.iter().cloned())
            .with_sort(self.sort)
            .with_is_reply(self.reply)
            .with_has_label(self.has_label)
            .with_has_tag(self.has_tag)
            .with_has_embed(self.has_embed)
            .with_has_error(self.has_error);

        criteria.before = self.before;
        criteria.after = self.after;

        for tag in &self.tags {
            criteria = criteria.with_hashtag(tag.as_str());
        }
        for did in &self.authors {
            criteria = criteria.with_author(did.as_str());
        }
        for label in &self.include_labels {
            criteria = criteria.include_label(label.as_str());
        }
        if exclude_known && !self.show_labelled {
            criteria = criteria.exclude_known_labels();
        }
        for label in &self.exclude_labels {
            criteria = criteria.exclude_label(label.as_str());
        }
        for kind in &self.embeds {
            criteria = criteria.with_embed_type(kind.clone());
        }
        criteria
    }
}

// ============================================================================
// Tests
// ============================================================================
