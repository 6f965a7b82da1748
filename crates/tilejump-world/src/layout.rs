//! Level layout input.
//!
//! A layout is the already-decoded description of a level: tile layers with
//! bounds and kinds, plus object spawns. It is read from JSON; decoding the
//! compressed tile-map format happens upstream. A tile layer that fails to
//! decode or validate is skipped with a warning so the rest of the level
//! still loads.

use serde::{Deserialize, Serialize};
use tilejump_core::geom::{Rect, Vec2};
use tracing::warn;

use crate::enemies::EnemyKind;
use crate::geometry::{GeometryTile, TileKind};
use crate::items::{Decoration, DecorationKind, ItemKind, KeyColor};

/// Edge length of a map tile.
pub const TILE_SIZE: f32 = 128.0;

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The document is not a usable layout.
    Parse(String),
    Io(String),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(m) => write!(f, "invalid level layout: {m}"),
            Self::Io(m) => write!(f, "could not read level layout: {m}"),
        }
    }
}

impl std::error::Error for LayoutError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TilePlacement {
    #[serde(flatten)]
    pub bounds: Rect,
    pub kind: TileKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub tiles: Vec<TilePlacement>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrapSpawn {
    Saw { x: f32, y: f32, w: f32, h: f32 },
    Spikes { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelLayout {
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Top-left corner of the player sprite at spawn.
    pub spawn: Vec2,
    pub layers: Vec<TileLayer>,
    pub enemies: Vec<EnemySpawn>,
    pub traps: Vec<TrapSpawn>,
    pub items: Vec<ItemSpawn>,
    pub decorations: Vec<Decoration>,
}

#[derive(Deserialize)]
struct RawLayout {
    #[serde(default)]
    name: String,
    width: f32,
    height: f32,
    #[serde(default)]
    spawn: Vec2,
    #[serde(default)]
    layers: Vec<serde_json::Value>,
    #[serde(default)]
    enemies: Vec<EnemySpawn>,
    #[serde(default)]
    traps: Vec<TrapSpawn>,
    #[serde(default)]
    items: Vec<ItemSpawn>,
    #[serde(default)]
    decorations: Vec<Decoration>,
}

/// A tile names its kind directly, through a ground-tileset GID, or not at
/// all, in which case it inherits the layer's kind.
#[derive(Deserialize)]
struct RawLayer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: Option<TileKind>,
    tiles: Vec<RawTile>,
}

#[derive(Deserialize)]
struct RawTile {
    x: f32,
    y: f32,
    #[serde(default = "tile_size")]
    w: f32,
    #[serde(default = "tile_size")]
    h: f32,
    #[serde(default)]
    kind: Option<TileKind>,
    #[serde(default)]
    gid: Option<u32>,
}

fn tile_size() -> f32 {
    TILE_SIZE
}

fn decode_layer(value: serde_json::Value) -> Result<TileLayer, String> {
    let raw: RawLayer = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let mut tiles = Vec::with_capacity(raw.tiles.len());
    for t in raw.tiles {
        let bounds = Rect::new(t.x, t.y, t.w, t.h);
        if !bounds.is_well_formed() {
            return Err(format!("tile at ({}, {}) has invalid bounds", t.x, t.y));
        }
        let kind = t
            .kind
            .or_else(|| t.gid.and_then(TileKind::from_gid))
            .or(raw.kind)
            .ok_or_else(|| match t.gid {
                Some(gid) => format!("unknown gid {gid} at ({}, {})", t.x, t.y),
                None => format!("tile at ({}, {}) has no kind", t.x, t.y),
            })?;
        tiles.push(TilePlacement { bounds, kind });
    }
    Ok(TileLayer {
        name: raw.name,
        tiles,
    })
}

impl LevelLayout {
    /// Parse a layout. Fails only when the document as a whole is unusable;
    /// bad tile layers are dropped individually.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let raw: RawLayout =
            serde_json::from_str(json).map_err(|e| LayoutError::Parse(e.to_string()))?;
        if !(raw.width.is_finite() && raw.height.is_finite() && raw.width > 0.0 && raw.height > 0.0)
        {
            return Err(LayoutError::Parse(format!(
                "level size {}x{} is not positive",
                raw.width, raw.height
            )));
        }

        let mut layers = Vec::with_capacity(raw.layers.len());
        for (i, value) in raw.layers.into_iter().enumerate() {
            let label = value
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| format!("#{i}"), str::to_string);
            match decode_layer(value) {
                Ok(layer) => layers.push(layer),
                Err(e) => warn!("Skipping tile layer {label} in '{}': {e}", raw.name),
            }
        }

        Ok(Self {
            name: raw.name,
            width: raw.width,
            height: raw.height,
            spawn: raw.spawn,
            layers,
            enemies: raw.enemies,
            traps: raw.traps,
            items: raw.items,
            decorations: raw.decorations,
        })
    }

    /// All tiles of all layers as geometry, in layer order.
    pub fn geometry(&self) -> Vec<GeometryTile> {
        self.layers
            .iter()
            .flat_map(|l| l.tiles.iter())
            .map(|t| GeometryTile::new(t.bounds, t.kind))
            .collect()
    }
}

impl LevelLayout {
    pub fn read(path: &str) -> Result<Self, LayoutError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LayoutError::Io(format!("{path}: {e}")))?;
        Self::from_json(&content)
    }
}

/// Load a layout from a JSON file, or `None` if it is missing or unusable.
pub fn load_layout_from_file(path: &str) -> Option<LevelLayout> {
    match LevelLayout::read(path) {
        Ok(layout) => Some(layout),
        Err(LayoutError::Io(_)) => None,
        Err(e) => {
            warn!("Failed to parse {path}: {e}");
            None
        },
    }
}

/// Load the level named by env var `TILEJUMP_LEVEL`, falling back to
/// [`demo_layout`] when it is unset, missing or unparseable.
pub fn load_layout() -> LevelLayout {
    match std::env::var("TILEJUMP_LEVEL") {
        Ok(path) => load_layout_from_file(&path).unwrap_or_else(demo_layout),
        Err(_) => demo_layout(),
    }
}

fn row(x0: f32, y: f32, count: usize, kind: TileKind) -> Vec<TilePlacement> {
    (0..count)
        .map(|i| TilePlacement {
            bounds: Rect::new(x0 + i as f32 * TILE_SIZE, y, TILE_SIZE, TILE_SIZE),
            kind,
        })
        .collect()
}

fn tile_item(kind: ItemKind, x: f32, y: f32) -> ItemSpawn {
    ItemSpawn {
        kind,
        rect: Rect::new(x, y, TILE_SIZE, TILE_SIZE),
    }
}

/// Built-in 30x20 tile level: a meadow, a slope up to a plateau with two
/// coin boxes, a ledge over a pit and a lower field with traps that ends in
/// a locked door.
pub fn demo_layout() -> LevelLayout {
    let mut ground = row(0.0, 1408.0, 10, TileKind::Flat);
    ground.extend(row(1408.0, 1280.0, 7, TileKind::Flat));
    ground.extend(row(2560.0, 1664.0, 10, TileKind::Flat));

    LevelLayout {
        name: "level1".to_string(),
        width: 30.0 * TILE_SIZE,
        height: 20.0 * TILE_SIZE,
        spawn: Vec2::new(64.0, 1280.0),
        layers: vec![
            TileLayer {
                name: "ground".to_string(),
                tiles: ground,
            },
            TileLayer {
                name: "slopes".to_string(),
                tiles: row(1280.0, 1280.0, 1, TileKind::Slope),
            },
            TileLayer {
                name: "ledges".to_string(),
                tiles: row(2432.0, 1280.0, 1, TileKind::SemiSolid),
            },
            TileLayer {
                name: "boxes".to_string(),
                tiles: row(1792.0, 896.0, 2, TileKind::Box),
            },
            TileLayer {
                name: "hazards".to_string(),
                tiles: row(2944.0, 1536.0, 1, TileKind::Hazard),
            },
        ],
        enemies: vec![
            EnemySpawn {
                kind: EnemyKind::Slime,
                x: 898.0,
                y: 1300.0,
            },
            EnemySpawn {
                kind: EnemyKind::Snail,
                x: 1790.0,
                y: 1200.0,
            },
            EnemySpawn {
                kind: EnemyKind::Fly,
                x: 2600.0,
                y: 1480.0,
            },
            EnemySpawn {
                kind: EnemyKind::Slime,
                x: 3300.0,
                y: 1600.0,
            },
        ],
        traps: vec![TrapSpawn::Saw {
            x: 3200.0,
            y: 1536.0,
            w: TILE_SIZE,
            h: TILE_SIZE,
        }],
        items: vec![
            tile_item(ItemKind::Coin, 384.0, 1152.0),
            tile_item(ItemKind::Coin, 512.0, 1152.0),
            tile_item(ItemKind::Coin, 640.0, 1152.0),
            tile_item(ItemKind::Coin, 2048.0, 1024.0),
            tile_item(ItemKind::Coin, 2816.0, 1408.0),
            tile_item(ItemKind::Jewel, 3072.0, 1152.0),
            tile_item(ItemKind::Key(KeyColor::Yellow), 3456.0, 1536.0),
        ],
        decorations: vec![
            Decoration {
                rect: Rect::new(600.0, 1280.0, TILE_SIZE, TILE_SIZE),
                kind: DecorationKind::Scenery {
                    sprite: "tiles/bush".to_string(),
                },
            },
            Decoration {
                rect: Rect::new(3712.0, 1632.0, 32.0, 32.0),
                kind: DecorationKind::LockedDoor {
                    key: KeyColor::Yellow,
                },
            },
        ],
    }
}
