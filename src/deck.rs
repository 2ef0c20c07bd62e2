// ABOUTME: Slide deck model for the pitch-deck application
// ABOUTME: Loads a fixed, ordered sequence of slides from markdown

use crate::errors::{DeckError, Result};
use crate::utils;
use comrak::{markdown_to_html, ComrakOptions};
use log::info;
use std::fs;
use std::path::Path;

/// Markdown source of the bundled campus-marketplace pitch deck
const BUILTIN_DECK: &str = include_str!("../decks/campus-marketplace.md");

/// One screen of content
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub index: usize,
    pub title: String,
    /// Rendered HTML. Only the page renderer looks inside it.
    pub content: String,
}

/// The ordered slide sequence of one presentation.
///
/// Fixed once loaded: there is no API to insert or remove slides.
#[derive(Debug, Clone)]
pub struct Deck {
    title: String,
    slides: Vec<Slide>,
}

impl Deck {
    /// Build a deck from already-rendered slides, re-numbering them in order
    pub fn new(title: impl Into<String>, slides: Vec<(String, String)>) -> Result<Self> {
        if slides.is_empty() {
            return Err(DeckError::InvalidDeck("Deck contains no slides".to_string()));
        }

        let slides = slides
            .into_iter()
            .enumerate()
            .map(|(index, (title, content))| Slide {
                index,
                title,
                content,
            })
            .collect();

        Ok(Self {
            title: title.into(),
            slides,
        })
    }

    /// The deck shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_markdown(BUILTIN_DECK)
    }

    /// Load a deck from a markdown file on disk
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading deck from {:?}", path);

        utils::validate_file_exists(path)?;
        let markdown = fs::read_to_string(path)?;
        Self::from_markdown(&markdown)
    }

    /// Parse markdown where slides are separated by `---` lines.
    ///
    /// An optional first line `% Title` names the deck. Each slide's title is
    /// its first heading, or "Slide N" when it has none.
    pub fn from_markdown(markdown: &str) -> Result<Self> {
        let (title, body) = parse_frontmatter(markdown);

        let mut options = ComrakOptions::default();
        options.render.unsafe_ = true;
        options.extension.table = true;
        options.extension.strikethrough = true;

        let slides: Vec<(String, String)> = split_slides(&body)
            .into_iter()
            .enumerate()
            .map(|(i, source)| {
                let title = slide_title(&source).unwrap_or_else(|| format!("Slide {}", i + 1));
                (title, markdown_to_html(&source, &options))
            })
            .collect();

        let deck = Self::new(title, slides)?;
        info!("Loaded deck {:?} with {} slides", deck.title, deck.len());
        Ok(deck)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }
}

/// Split off a leading `% Title` line
fn parse_frontmatter(content: &str) -> (String, String) {
    let mut lines = content.lines();

    match lines.next() {
        Some(first) if first.starts_with("% ") => {
            let title = first.trim_start_matches("% ").trim().to_string();
            let rest: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
            (title, rest.join("\n"))
        }
        _ => ("Presentation".to_string(), content.to_string()),
    }
}

/// Split markdown into per-slide sources, dropping empty chunks
fn split_slides(body: &str) -> Vec<String> {
    let mut slides = Vec::new();
    let mut current = Vec::new();

    for line in body.lines() {
        if line.trim() == "---" {
            slides.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    slides.push(current.join("\n"));

    slides
        .into_iter()
        .filter(|slide| !slide.trim().is_empty())
        .collect()
}

/// First markdown heading of a slide, without its `#` markers
fn slide_title(source: &str) -> Option<String> {
    source
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
}
