//! Stimulus bitmaps and the catalog built from them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use rotask_types::{CatalogError, Category, StimulusCatalog, StimulusId};

use crate::raster::{Bitmap, BitmapError};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid bitmap {}: {source}", path.display())]
    Bitmap {
        path: PathBuf,
        #[source]
        source: BitmapError,
    },
    #[error("stimulus {0} is defined twice")]
    Duplicate(StimulusId),
}

#[derive(Debug, Clone)]
struct Entry {
    category: Category,
    bitmap: Bitmap,
}

/// Bitmaps keyed by stimulus id, each tagged with its category.
#[derive(Debug, Clone, Default)]
pub struct StimulusLibrary {
    entries: BTreeMap<StimulusId, Entry>,
}

impl StimulusLibrary {
    /// The reference stimulus set: five tools and six non-tools.
    #[must_use]
    pub fn builtin() -> Self {
        let mut library = Self::default();
        for (category, id, rows) in BUILTIN {
            match Bitmap::from_rows(rows) {
                Ok(bitmap) => {
                    library.entries.insert(
                        StimulusId::from(*id),
                        Entry {
                            category: *category,
                            bitmap,
                        },
                    );
                }
                Err(err) => debug!(id, "Skipping malformed built-in stimulus: {err}"),
            }
        }
        library
    }

    /// Load `<dir>/tools/*.txt` and `<dir>/non_tools/*.txt`. The file stem
    /// is the stimulus id. A missing category directory contributes nothing.
    pub fn load_dir(dir: &Path) -> Result<Self, LibraryError> {
        let mut library = Self::default();
        for category in Category::ALL {
            let sub = dir.join(category.as_str());
            if !sub.is_dir() {
                debug!(path = %sub.display(), "No stimulus directory for category");
                continue;
            }

            let mut paths = Vec::new();
            let read = fs::read_dir(&sub).map_err(|source| LibraryError::Io {
                path: sub.clone(),
                source,
            })?;
            for entry in read {
                let entry = entry.map_err(|source| LibraryError::Io {
                    path: sub.clone(),
                    source,
                })?;
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "txt") {
                    paths.push(path);
                }
            }
            paths.sort();

            for path in paths {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let id = StimulusId::from(stem);
                let text = fs::read_to_string(&path).map_err(|source| LibraryError::Io {
                    path: path.clone(),
                    source,
                })?;
                let bitmap = Bitmap::parse(&text)
                    .map_err(|source| LibraryError::Bitmap { path: path.clone(), source })?;
                if library.entries.contains_key(&id) {
                    return Err(LibraryError::Duplicate(id));
                }
                library.entries.insert(id, Entry { category, bitmap });
            }
        }
        info!(path = %dir.display(), stimuli = library.len(), "Loaded stimulus directory");
        Ok(library)
    }

    #[must_use]
    pub fn bitmap(&self, id: &StimulusId) -> Option<&Bitmap> {
        self.entries.get(id).map(|e| &e.bitmap)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group ids by category. Fails if a category ends up empty.
    pub fn catalog(&self) -> Result<StimulusCatalog, CatalogError> {
        let mut grouped: BTreeMap<Category, Vec<StimulusId>> =
            Category::ALL.iter().map(|&c| (c, Vec::new())).collect();
        for (id, entry) in &self.entries {
            grouped.entry(entry.category).or_default().push(id.clone());
        }
        StimulusCatalog::new(grouped)
    }
}

type Builtin = (Category, &'static str, [&'static str; 12]);

const BUILTIN: &[Builtin] = &[
    (
        Category::Tool,
        "stanley_knife",
        [
            "............",
            "............",
            "..........#.",
            ".........##.",
            "........###.",
            ".......####.",
            "..#########.",
            ".##########.",
            ".#######....",
            ".######.....",
            "............",
            "............",
        ],
    ),
    (
        Category::Tool,
        "hammer",
        [
            "............",
            ".#######....",
            ".########...",
            ".#######.##.",
            "....##......",
            "....##......",
            "....##......",
            "....##......",
            "....##......",
            "....##......",
            "....###.....",
            "............",
        ],
    ),
    (
        Category::Tool,
        "wrench",
        [
            "........##..",
            ".......#..#.",
            ".......#....",
            "......###..#",
            ".....####.#.",
            "....###.....",
            "...###......",
            "..###.......",
            ".###........",
            "###.........",
            "##..........",
            "............",
        ],
    ),
    (
        Category::Tool,
        "swiss_knife",
        [
            "............",
            "........##..",
            ".......##...",
            "......##....",
            ".....##.....",
            "..##########",
            ".###########",
            ".###########",
            "..##########",
            "......#.....",
            ".....##.....",
            "............",
        ],
    ),
    (
        Category::Tool,
        "jigsaw",
        [
            "............",
            "..######....",
            ".#......#...",
            ".#..##..#...",
            ".#......#...",
            ".#########..",
            "....#####...",
            "......#.....",
            "......#.....",
            "......#.....",
            "............",
            "............",
        ],
    ),
    (
        Category::NonTool,
        "shark",
        [
            "............",
            "......#.....",
            ".....##.....",
            "....###.....",
            "..#######...",
            ".##########.",
            "############",
            ".#########..",
            "...##...#...",
            "............",
            "............",
            "............",
        ],
    ),
    (
        Category::NonTool,
        "cactus",
        [
            ".....##.....",
            "....####....",
            "....####....",
            "#...####....",
            "#...####..#.",
            "##..####..#.",
            ".#######.##.",
            "....######..",
            "....####....",
            "....####....",
            "...######...",
            "..########..",
        ],
    ),
    (
        Category::NonTool,
        "stomach",
        [
            "..##........",
            "..##........",
            "...##.......",
            "....######..",
            "...########.",
            "..#########.",
            "..########..",
            "..#######...",
            "...#####....",
            ".....###....",
            "......###...",
            ".......##...",
        ],
    ),
    (
        Category::NonTool,
        "icicle",
        [
            "############",
            ".##########.",
            ".#########..",
            "..########..",
            "..#######...",
            "...######...",
            "...#####....",
            "....####....",
            "....###.....",
            ".....##.....",
            ".....#......",
            ".....#......",
        ],
    ),
    (
        Category::NonTool,
        "cordyceps",
        [
            "...#........",
            "...##.......",
            "....##...#..",
            ".....#..##..",
            ".....#.##...",
            "......##....",
            "......#.....",
            ".....###....",
            "....#####...",
            "...#######..",
            "...#######..",
            "............",
        ],
    ),
    (
        Category::NonTool,
        "feather",
        [
            "..........##",
            "........####",
            ".......####.",
            "......#####.",
            ".....#####..",
            "....#####...",
            "...#####....",
            "..####......",
            "..###.......",
            ".#..........",
            "#...........",
            "............",
        ],
    ),
];
