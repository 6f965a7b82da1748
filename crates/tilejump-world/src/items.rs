//! Collectibles and static decorations.

use serde::{Deserialize, Serialize};
use tilejump_core::draw::{Camera, Drawable, Surface};
use tilejump_core::geom::Rect;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KeyColor {
    Yellow,
    Blue,
    Green,
    Red,
}

impl KeyColor {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyColor::Yellow => "yellow",
            KeyColor::Blue => "blue",
            KeyColor::Green => "green",
            KeyColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Coin,
    Jewel,
    Key(KeyColor),
}

impl ItemKind {
    pub fn sprite(self) -> &'static str {
        match self {
            ItemKind::Coin => "items/coinGold",
            ItemKind::Jewel => "items/gemBlue",
            ItemKind::Key(KeyColor::Yellow) => "items/keyYellow",
            ItemKind::Key(KeyColor::Blue) => "items/keyBlue",
            ItemKind::Key(KeyColor::Green) => "items/keyGreen",
            ItemKind::Key(KeyColor::Red) => "items/keyRed",
        }
    }
}

/// A pickup. Items dropped out of boxes carry a `fall_target`: the y their
/// bottom edge slides down to before they come to rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub rect: Rect,
    pub kind: ItemKind,
    collected: bool,
    fall_target: Option<f32>,
}

impl Item {
    pub fn new(rect: Rect, kind: ItemKind) -> Self {
        Self {
            rect,
            kind,
            collected: false,
            fall_target: None,
        }
    }

    /// Item that falls until its bottom reaches `target_y`.
    pub fn dropped(rect: Rect, kind: ItemKind, target_y: f32) -> Self {
        Self {
            fall_target: target_y.is_finite().then_some(target_y),
            ..Self::new(rect, kind)
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn is_falling(&self) -> bool {
        self.fall_target.is_some()
    }

    pub fn update(&mut self, dt: f32, drop_speed: f32) {
        let Some(target) = self.fall_target else {
            return;
        };
        self.rect.y += drop_speed * dt;
        if self.rect.bottom() >= target {
            self.rect.y = target - self.rect.h;
            self.fall_target = None;
        }
    }

    /// Collect once. Later calls return `None`.
    pub fn collect(&mut self) -> Option<ItemKind> {
        if self.collected {
            return None;
        }
        self.collected = true;
        Some(self.kind)
    }
}

impl Drawable for Item {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        if !self.collected {
            surface.blit(self.kind.sprite(), camera.apply(&self.rect), false);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Scenery { sprite: String },
    /// Level exit, opened by a key of this colour.
    LockedDoor { key: KeyColor },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decoration {
    pub rect: Rect,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn required_key(&self) -> Option<KeyColor> {
        match self.kind {
            DecorationKind::LockedDoor { key } => Some(key),
            DecorationKind::Scenery { .. } => None,
        }
    }
}

impl Drawable for Decoration {
    fn draw(&self, surface: &mut dyn Surface, camera: &Camera) {
        let dest = camera.apply(&self.rect);
        match &self.kind {
            DecorationKind::Scenery { sprite } => surface.blit(sprite, dest, false),
            DecorationKind::LockedDoor { key } => {
                surface.blit(&format!("tiles/lock_{}", key.as_str()), dest, false)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilejump_core::test_helpers::RecordingSurface;

    #[test]
    fn collect_is_one_shot() {
        let mut coin = Item::new(Rect::new(0.0, 0.0, 128.0, 128.0), ItemKind::Coin);
        assert_eq!(coin.collect(), Some(ItemKind::Coin));
        assert!(coin.is_collected());
        assert_eq!(coin.collect(), None);
    }

    #[test]
    fn dropped_item_settles_on_target() {
        let mut coin = Item::dropped(Rect::new(0.0, 100.0, 128.0, 128.0), ItemKind::Coin, 400.0);
        assert!(coin.is_falling());
        for _ in 0..60 {
            coin.update(1.0 / 60.0, 600.0);
        }
        assert_eq!(coin.rect.bottom(), 400.0);
        assert!(!coin.is_falling());
    }

    #[test]
    fn static_item_does_not_move() {
        let mut key = Item::new(Rect::new(0.0, 100.0, 128.0, 128.0), ItemKind::Key(KeyColor::Yellow));
        key.update(1.0, 600.0);
        assert_eq!(key.rect.y, 100.0);
    }

    #[test]
    fn non_finite_target_is_static() {
        let coin = Item::dropped(Rect::new(0.0, 0.0, 10.0, 10.0), ItemKind::Coin, f32::NAN);
        assert!(!coin.is_falling());
    }

    #[test]
    fn collected_items_are_not_drawn() {
        let mut jewel = Item::new(Rect::new(0.0, 0.0, 128.0, 128.0), ItemKind::Jewel);
        let mut surface = RecordingSurface::new();
        jewel.draw(&mut surface, &Camera::default());
        assert_eq!(surface.sprites(), vec!["items/gemBlue"]);
        jewel.collect();
        jewel.draw(&mut surface, &Camera::default());
        assert_eq!(surface.calls.len(), 1);
    }

    #[test]
    fn door_reports_its_key() {
        let door = Decoration {
            rect: Rect::new(0.0, 0.0, 32.0, 32.0),
            kind: DecorationKind::LockedDoor {
                key: KeyColor::Yellow,
            },
        };
        assert_eq!(door.required_key(), Some(KeyColor::Yellow));
        let mut surface = RecordingSurface::new();
        door.draw(&mut surface, &Camera::default());
        assert_eq!(surface.sprites(), vec!["tiles/lock_yellow"]);
    }

    #[test]
    fn item_kind_json_shape() {
        let kind: ItemKind = serde_json::from_str(r#"{"key":"blue"}"#).unwrap();
        assert_eq!(kind, ItemKind::Key(KeyColor::Blue));
        let coin: ItemKind = serde_json::from_str(r#""coin""#).unwrap();
        assert_eq!(coin, ItemKind::Coin);
    }
}
