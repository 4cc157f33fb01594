use ankisync::infrastructure::CollectionRepository;
use anki::collection::{Collection, CollectionBuilder};
use anki::search::SortMode;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture for working with a fresh, temporary Anki collection.
///
/// A new collection ships with the stock `Basic` notetype (`Front`, `Back`)
/// and the `Default` deck.
#[allow(dead_code)]
pub struct TestCollection {
    _temp_dir: TempDir,
    pub collection_path: PathBuf,
}

#[allow(dead_code)]
impl TestCollection {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let collection_path = temp_dir.path().join("collection.anki2");

        // Building creates the file; dropping closes it again
        let collection = CollectionBuilder::new(collection_path.clone())
            .build()
            .context("Failed to create test collection")?;
        drop(collection);

        Ok(Self {
            _temp_dir: temp_dir,
            collection_path,
        })
    }

    /// Create a fresh collection that also contains the given decks.
    pub fn with_decks(deck_names: &[&str]) -> Result<Self> {
        let test_collection = Self::new()?;
        let mut collection = test_collection.open_raw()?;
        for name in deck_names {
            collection
                .get_or_create_normal_deck(name)
                .with_context(|| format!("Failed to create deck {name}"))?;
        }
        drop(collection);
        Ok(test_collection)
    }

    /// Number of cards of `note_id` that live in `deck_name`.
    ///
    /// Opens the collection itself, so no repository may be open at the same time.
    pub fn cards_in_deck(&self, note_id: i64, deck_name: &str) -> Result<usize> {
        let mut collection = self.open_raw()?;
        let search = format!("nid:{note_id} \"deck:{deck_name}\"");
        let cards = collection
            .search_cards(search.as_str(), SortMode::NoOrder)
            .context("Failed to search cards")?;
        Ok(cards.len())
    }

    fn open_raw(&self) -> Result<Collection> {
        CollectionBuilder::new(self.collection_path.clone())
            .build()
            .context("Failed to open test collection")
    }

    pub fn open_repository(&self) -> Result<CollectionRepository> {
        CollectionRepository::new(&self.collection_path)
    }
}

/// Directory of note files written by a test.
#[allow(dead_code)]
pub struct NoteDir {
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl NoteDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir().context("Failed to create temporary directory")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name` below the directory, creating parents.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.temp_dir.path().join(name);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[allow(dead_code)]
pub mod note_files {
    /// Basic note without an id, targeting the stock notetype and deck.
    pub const NEW_BASIC: &str = "---
deck_name: Default
model_name: Basic
tags: rust ownership
---

## Front
What does the borrow checker enforce?

## Back
Aliasing XOR mutability.
";

    /// Three sections in an order that differs from alphabetical.
    pub const QUESTION_ANSWER_SOURCE: &str = "---
deck_name: Rust::Basics
model_name: Q/A
---

## Question
What is a lifetime?

## Answer
A region of code a reference is valid for.

## Source
The Book, chapter 10
";

    pub const DUPLICATE_SECTION: &str = "---
deck_name: Default
model_name: Basic
---

## Question
First

## Question
Second
";

    pub const UNKNOWN_ID: &str = "---
note_id: 999999999
deck_name: Default
model_name: Basic
---

## Front
Q

## Back
A
";

    pub const NONEXISTENT_NOTE_ID: i64 = 999999999;
}
