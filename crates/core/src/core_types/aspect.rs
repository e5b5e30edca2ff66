//! Compass aspects of a mountain face
//!
//! The eight aspects are a fixed, ordered table. Renderers iterate
//! [`Aspect::ALL`] positionally, so the order N, NE, E, SE, S, SW, W, NW is part
//! of the public contract.

use crate::core_types::units::Degrees;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the eight compass directions a face can point toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aspect {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Aspect {
    /// All aspects in compass order
    pub const ALL: [Aspect; 8] = [
        Aspect::N,
        Aspect::NE,
        Aspect::E,
        Aspect::SE,
        Aspect::S,
        Aspect::SW,
        Aspect::W,
        Aspect::NW,
    ];

    /// Fixed bearing of this aspect (0 = North, clockwise)
    #[must_use]
    pub fn bearing(self) -> Degrees {
        Degrees::new(self.index() as f64 * 45.0)
    }

    /// Compass label ("N", "NE", ...)
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Aspect::N => "N",
            Aspect::NE => "NE",
            Aspect::E => "E",
            Aspect::SE => "SE",
            Aspect::S => "S",
            Aspect::SW => "SW",
            Aspect::W => "W",
            Aspect::NW => "NW",
        }
    }

    /// Position in [`Aspect::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snap an arbitrary bearing to the nearest compass point
    ///
    /// Sector boundaries (e.g. 22.5°) round clockwise.
    #[must_use]
    pub fn from_bearing(bearing: Degrees) -> Aspect {
        let sector = ((*bearing.normalized() + 22.5) / 45.0).floor() as usize % 8;
        Aspect::ALL[sector]
    }

    /// Parse a compass label, case-insensitively
    #[must_use]
    pub fn from_name(name: &str) -> Option<Aspect> {
        Aspect::ALL
            .into_iter()
            .find(|aspect| aspect.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Aspect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Aspect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Aspect::from_name(&label)
            .ok_or_else(|| D::Error::custom(format!("unknown compass aspect '{label}'")))
    }
}

/// A value for each of the eight aspects, stored in compass order
///
/// Serializes as a JSON object keyed by compass name, in compass order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AspectMap<T> {
    values: [T; 8],
}

/// Formation rates for every aspect
pub type AspectRates = AspectMap<f64>;

impl<T: Copy> AspectMap<T> {
    /// Same value on every aspect
    #[must_use]
    pub fn uniform(value: T) -> Self {
        Self { values: [value; 8] }
    }

    /// Evaluate `f` for each aspect in compass order
    pub fn from_fn(mut f: impl FnMut(Aspect) -> T) -> Self {
        Self {
            values: Aspect::ALL.map(&mut f),
        }
    }

    /// Iterate `(aspect, value)` pairs in compass order
    pub fn entries(&self) -> impl Iterator<Item = (Aspect, T)> + '_ {
        Aspect::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Values in compass order
    #[must_use]
    pub fn values(&self) -> [T; 8] {
        self.values
    }
}

impl AspectRates {
    /// Largest rate across all aspects
    #[must_use]
    pub fn max_rate(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Aspects whose rate equals `rate`, in compass order
    #[must_use]
    pub fn aspects_at(&self, rate: f64) -> Vec<Aspect> {
        self.entries()
            .filter(|(_, value)| *value == rate)
            .map(|(aspect, _)| aspect)
            .collect()
    }
}

impl<T> Index<Aspect> for AspectMap<T> {
    type Output = T;
    fn index(&self, aspect: Aspect) -> &T {
        &self.values[aspect.index()]
    }
}

impl<T> IndexMut<Aspect> for AspectMap<T> {
    fn index_mut(&mut self, aspect: Aspect) -> &mut T {
        &mut self.values[aspect.index()]
    }
}

impl<T: Serialize> Serialize for AspectMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(8))?;
        for (aspect, value) in Aspect::ALL.iter().zip(&self.values) {
            map.serialize_entry(aspect.name(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Copy> Deserialize<'de> for AspectMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = std::collections::BTreeMap::<Aspect, T>::deserialize(deserializer)?;
        let values = Aspect::ALL
            .iter()
            .map(|aspect| {
                entries
                    .get(aspect)
                    .copied()
                    .ok_or_else(|| D::Error::custom(format!("missing compass aspect '{aspect}'")))
            })
            .collect::<Result<Vec<T>, D::Error>>()?;
        let values: [T; 8] = values
            .try_into()
            .map_err(|_| D::Error::custom("expected one value per compass aspect"))?;
        Ok(Self { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearings_match_compass_table() {
        let bearings: Vec<f64> = Aspect::ALL.iter().map(|a| *a.bearing()).collect();
        assert_eq!(
            bearings,
            vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]
        );
    }

    #[test]
    fn test_from_bearing_snaps_and_wraps() {
        assert_eq!(Aspect::from_bearing(Degrees::new(10.0)), Aspect::N);
        assert_eq!(Aspect::from_bearing(Degrees::new(22.5)), Aspect::NE);
        assert_eq!(Aspect::from_bearing(Degrees::new(350.0)), Aspect::N);
        assert_eq!(Aspect::from_bearing(Degrees::new(-90.0)), Aspect::W);
        assert_eq!(Aspect::from_bearing(Degrees::new(200.0)), Aspect::S);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Aspect::from_name("nw"), Some(Aspect::NW));
        assert_eq!(Aspect::from_name(" E "), Some(Aspect::E));
        assert_eq!(Aspect::from_name("north"), None);
    }

    #[test]
    fn test_aspect_map_serializes_in_compass_order() {
        let map = AspectMap::from_fn(|a| a.index() as f64);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"N":0.0,"NE":1.0,"E":2.0,"SE":3.0,"S":4.0,"SW":5.0,"W":6.0,"NW":7.0}"#
        );
        let back: AspectRates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_aspect_map_requires_every_aspect() {
        let partial = r#"{"N":0.1,"NE":0.2,"E":0.3,"SE":0.4,"S":0.5,"SW":0.6,"W":0.7}"#;
        let err = serde_json::from_str::<AspectRates>(partial).unwrap_err();
        assert!(err.to_string().contains("missing compass aspect 'NW'"));

        let unknown = r#"{"N":0.1,"north-west":0.2}"#;
        assert!(serde_json::from_str::<AspectRates>(unknown).is_err());
    }

    #[test]
    fn test_max_and_ties() {
        let mut rates = AspectRates::uniform(0.1);
        rates[Aspect::W] = 0.5;
        rates[Aspect::SW] = 0.5;
        assert_eq!(rates.max_rate(), 0.5);
        assert_eq!(rates.aspects_at(0.5), vec![Aspect::SW, Aspect::W]);
    }
}
