//! Sprite families and pattern slot assignment.
//!
//! Skins sharing a name prefix (`hero:red`, `hero:blue`) form a family that
//! occupies one hardware sprite slot and one region of pattern memory.

use std::collections::HashSet;

use crate::error::{ConvertError, MAX_PATTERNS};
use crate::models::{Cel, Layer, Sprite, Tileset};

/// A layer together with the sprite that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Skin<'a> {
    pub sprite: &'a Sprite,
    pub layer: &'a Layer,
}

impl<'a> Skin<'a> {
    pub fn name(&self) -> &'a str {
        &self.layer.name
    }

    pub fn tileset(&self) -> Result<&'a Tileset, ConvertError> {
        self.sprite
            .layer_tileset(self.layer)
            .ok_or_else(|| ConvertError::MissingTileset { layer: self.layer.name.clone() })
    }
}

/// Every skin of every sprite, in input order.
pub fn skins(sprites: &[Sprite]) -> Vec<Skin<'_>> {
    sprites
        .iter()
        .flat_map(|sprite| sprite.layers.iter().map(move |layer| Skin { sprite, layer }))
        .collect()
}

/// Skins grouped under one family name.
#[derive(Debug, Clone)]
pub struct Family<'a> {
    pub name: String,
    pub skins: Vec<Skin<'a>>,
}

impl<'a> Family<'a> {
    /// Largest number of distinct patterns any cel of the family uses.
    pub fn pattern_requirement(&self) -> usize {
        self.cels().map(distinct_patterns).max().unwrap_or(0)
    }

    /// Largest number of tiles any cel of the family uses.
    pub fn max_tiles(&self) -> usize {
        self.cels().map(Cel::tile_count).max().unwrap_or(0)
    }

    /// Frames per skin (taken from the first skin).
    pub fn frame_count(&self) -> usize {
        self.skins.first().map_or(0, |s| s.layer.cels.len())
    }

    fn cels(&self) -> impl Iterator<Item = &'a Cel> + '_ {
        self.skins.iter().flat_map(|s| s.layer.cels.iter())
    }
}

/// Number of distinct tile identities in a cel (equal to its deduplicated pattern count).
pub fn distinct_patterns(cel: &Cel) -> usize {
    cel.tilemap.iter().map(|t| t.tile).collect::<HashSet<_>>().len()
}

/// Group skins by family, families in first-seen order.
pub fn families(sprites: &[Sprite]) -> Vec<Family<'_>> {
    let mut families: Vec<Family> = Vec::new();
    for skin in skins(sprites) {
        let name = skin.layer.family();
        match families.iter_mut().find(|f| f.name == name) {
            Some(family) => family.skins.push(skin),
            None => families.push(Family { name: name.to_string(), skins: vec![skin] }),
        }
    }
    families
}

/// Base pattern slot assigned to each family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSlots {
    slots: Vec<(String, u32)>,
    total: usize,
}

impl PatternSlots {
    /// Assign consecutive pattern regions to families.
    ///
    /// # Errors
    ///
    /// [`ConvertError::TooManyPatterns`] if the regions exceed the 64 patterns
    /// the attribute record can address.
    pub fn assign(families: &[Family]) -> Result<Self, ConvertError> {
        let mut slots = Vec::with_capacity(families.len());
        let mut total = 0usize;
        for family in families {
            slots.push((family.name.clone(), total as u32));
            total += family.pattern_requirement();
        }

        if total > MAX_PATTERNS {
            return Err(ConvertError::TooManyPatterns { count: total, limit: MAX_PATTERNS });
        }
        Ok(Self { slots, total })
    }

    /// First pattern slot of a family (0 for unknown families).
    pub fn base(&self, family: &str) -> u32 {
        self.slots.iter().find(|(name, _)| name == family).map_or(0, |(_, base)| *base)
    }

    /// Total pattern slots used.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TileRef;

    fn layer(name: &str, cels: Vec<Cel>) -> Layer {
        Layer { name: name.to_string(), tileset: None, cels }
    }

    fn cel_with(tiles: &[u32]) -> Cel {
        tiles
            .iter()
            .enumerate()
            .fold(Cel::new(16, 1), |cel, (x, &t)| cel.with_tile(TileRef::new(x as i32, 0, t)))
    }

    #[test]
    fn test_families_grouping_order() {
        let mut a = Sprite::new("a", 16, 16);
        a.layers.push(layer("ball", vec![]));
        a.layers.push(layer("hero:red", vec![]));
        let mut b = Sprite::new("b", 16, 16);
        b.layers.push(layer("hero:blue", vec![]));
        b.layers.push(layer("ball:big", vec![]));

        let sprites = vec![a, b];
        let families = families(&sprites);
        let names: Vec<&str> = families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ball", "hero"]);
        let hero: Vec<&str> = families[1].skins.iter().map(|s| s.name()).collect();
        assert_eq!(hero, vec!["hero:red", "hero:blue"]);
    }

    #[test]
    fn test_pattern_requirement_and_slots() {
        let mut sprite = Sprite::new("s", 16, 16);
        sprite.layers.push(layer("ball", vec![cel_with(&[1, 1, 2])]));
        sprite.layers.push(layer("hero:a", vec![cel_with(&[1, 2, 3]), cel_with(&[4])]));
        sprite.layers.push(layer("hero:b", vec![cel_with(&[1, 2, 3, 4, 5])]));

        let sprites = vec![sprite];
        let families = families(&sprites);
        assert_eq!(families[0].pattern_requirement(), 2);
        assert_eq!(families[1].pattern_requirement(), 5);
        assert_eq!(families[1].max_tiles(), 5);
        assert_eq!(families[1].frame_count(), 2);

        let slots = PatternSlots::assign(&families).unwrap();
        assert_eq!(slots.base("ball"), 0);
        assert_eq!(slots.base("hero"), 2);
        assert_eq!(slots.total(), 7);
    }

    #[test]
    fn test_too_many_patterns() {
        let tiles: Vec<u32> = (0..16).collect();
        let mut sprite = Sprite::new("s", 16, 16);
        for name in ["a", "b", "c", "d", "e"] {
            sprite.layers.push(layer(name, vec![cel_with(&tiles)]));
        }
        let sprites = vec![sprite];
        let err = PatternSlots::assign(&families(&sprites)).unwrap_err();
        assert!(matches!(err, ConvertError::TooManyPatterns { count: 80, limit: 64 }));
    }

    #[test]
    fn test_missing_tileset() {
        let mut sprite = Sprite::new("s", 16, 16);
        sprite.layers.push(layer("ball", vec![]));
        let sprites = vec![sprite];
        let skins = skins(&sprites);
        assert!(matches!(skins[0].tileset(), Err(ConvertError::MissingTileset { .. })));
    }
}
