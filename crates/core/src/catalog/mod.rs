use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ButtonError, Result};

/// A single screen of content: a background, a word and optional sounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: u32,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "image")]
    pub image_ref: String,
    #[serde(default, rename = "animalSound", skip_serializing_if = "Option::is_none")]
    pub animal_sound_ref: Option<String>,
    #[serde(default, rename = "spokenWord", skip_serializing_if = "Option::is_none")]
    pub spoken_word_ref: Option<String>,
}

impl ContentItem {
    pub fn new(id: u32, display_name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            image_ref: image_ref.into(),
            animal_sound_ref: None,
            spoken_word_ref: None,
        }
    }

    pub fn with_animal_sound(mut self, url: impl Into<String>) -> Self {
        self.animal_sound_ref = Some(url.into());
        self
    }

    pub fn with_spoken_word(mut self, url: impl Into<String>) -> Self {
        self.spoken_word_ref = Some(url.into());
        self
    }
}

/// Ordered, non-empty list of items for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct ContentCatalog {
    name: String,
    items: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct RawCatalog {
    name: String,
    items: Vec<ContentItem>,
}

impl TryFrom<RawCatalog> for ContentCatalog {
    type Error = ButtonError;

    fn try_from(raw: RawCatalog) -> Result<Self> {
        Self::new(raw.name, raw.items)
    }
}

impl ContentCatalog {
    /// Builds a catalog, refusing an empty item list.
    pub fn new(name: impl Into<String>, items: Vec<ContentItem>) -> Result<Self> {
        let name = name.into();
        if items.is_empty() {
            return Err(ButtonError::EmptyCatalog(name));
        }
        Ok(Self { name, items })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Returns the item at `index` or [`ButtonError::InvalidIndex`].
    pub fn item(&self, index: usize) -> Result<&ContentItem> {
        self.items.get(index).ok_or(ButtonError::InvalidIndex {
            index,
            len: self.items.len(),
        })
    }

    /// Maps any signed offset onto a valid index, wrapping in both directions.
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.items.len() as isize) as usize
    }

    pub fn next_index(&self, current: usize) -> usize {
        (current + 1) % self.items.len()
    }

    pub fn previous_index(&self, current: usize) -> usize {
        (current + self.items.len() - 1) % self.items.len()
    }
}

/// Named levels, each backed by its own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogSet")]
pub struct CatalogSet {
    levels: Vec<ContentCatalog>,
}

#[derive(Deserialize)]
struct RawCatalogSet {
    levels: Vec<ContentCatalog>,
}

impl TryFrom<RawCatalogSet> for CatalogSet {
    type Error = ButtonError;

    fn try_from(raw: RawCatalogSet) -> Result<Self> {
        Self::new(raw.levels)
    }
}

impl CatalogSet {
    pub fn new(levels: Vec<ContentCatalog>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ButtonError::EmptyCatalog("<levels>".to_string()));
        }
        Ok(Self { levels })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let set = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), levels = set.levels.len(), "catalog loaded");
        Ok(set)
    }

    /// Level shown at start-up.
    pub fn first(&self) -> &ContentCatalog {
        &self.levels[0]
    }

    pub fn level(&self, name: &str) -> Result<&ContentCatalog> {
        self.levels
            .iter()
            .find(|level| level.name == name)
            .ok_or_else(|| ButtonError::UnknownLevel(name.to_string()))
    }

    pub fn level_names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|level| level.name.as_str())
    }

    /// The built-in animals and farm levels.
    pub fn builtin() -> Self {
        let animal = |id: u32, name: &str, image: &str| {
            let stem = name.to_lowercase();
            ContentItem::new(id, name, image)
                .with_animal_sound(format!("/sounds/animals/{stem}.mp3"))
                .with_spoken_word(format!("/sounds/words/{stem}.mp3"))
        };

        let animals = ContentCatalog {
            name: "animals".to_string(),
            items: vec![
                animal(1, "Panda", "/images/bg1.jpg"),
                animal(2, "Rhino", "/images/bg2.jpg"),
                animal(3, "Lion", "/images/bg3.jpg"),
                animal(4, "Zebra", "/images/bg4.jpg"),
            ],
        };
        let farm = ContentCatalog {
            name: "farm".to_string(),
            items: vec![
                animal(1, "Cow", "/images/farm/cow.jpg"),
                animal(2, "Sheep", "/images/farm/sheep.jpg"),
                ContentItem::new(3, "Chicken", "/images/farm/chicken.jpg")
                    .with_animal_sound("/sounds/animals/chicken.mp3"),
                animal(4, "Horse", "/images/farm/horse.jpg"),
            ],
        };

        Self {
            levels: vec![animals, farm],
        }
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self::builtin()
    }
}
