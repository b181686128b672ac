use std::path::PathBuf;

use journey_protocol::{wire::hash_bytes_fnv1a64, CityId, LinkId, LinkKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("map has no cities")]
    Empty,
    #[error("too many cities or links for 16-bit ids")]
    TooLarge,
    #[error("link {link} references unknown city {city}")]
    UnknownCity { link: usize, city: u16 },
    #[error("link {link} connects city {city} to itself")]
    SelfLink { link: usize, city: u16 },
    #[error("air link {link} has no cost")]
    MissingAirCost { link: usize },
    #[error("air link {link} has zero cost")]
    ZeroAirCost { link: usize },
    #[error("{kind} link {link} must not carry a cost")]
    UnexpectedCost { link: usize, kind: &'static str },
    #[error("fingerprint encode error: {0}")]
    Fingerprint(#[from] rmp_serde::encode::Error),
}

pub enum MapSource<'a> {
    Embedded,
    Path(PathBuf),
    Json(&'a str),
}

#[derive(Debug, Deserialize)]
struct RawMap {
    cities: Vec<RawCity>,
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    cities: [u16; 2],
    #[serde(rename = "type")]
    kind: RawLinkType,
    #[serde(default)]
    cost: Option<u8>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawLinkType {
    Land,
    Sea,
    Air,
}

pub fn load_map(source: MapSource<'_>) -> Result<GameMap, MapError> {
    let raw: RawMap = match source {
        MapSource::Embedded => serde_json::from_str(include_str!("../data/europe.json"))?,
        MapSource::Path(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        MapSource::Json(json) => serde_json::from_str(json)?,
    };
    compile_map(raw)
}

fn compile_map(raw: RawMap) -> Result<GameMap, MapError> {
    let names: Vec<String> = raw.cities.into_iter().map(|c| c.name).collect();
    let mut links = Vec::with_capacity(raw.links.len());
    for (idx, link) in raw.links.into_iter().enumerate() {
        let kind = match (link.kind, link.cost) {
            (RawLinkType::Air, None) => return Err(MapError::MissingAirCost { link: idx }),
            (RawLinkType::Air, Some(0)) => return Err(MapError::ZeroAirCost { link: idx }),
            (RawLinkType::Air, Some(cost)) => LinkKind::Air { cost },
            (RawLinkType::Land, None) => LinkKind::Land,
            (RawLinkType::Sea, None) => LinkKind::Sea,
            (RawLinkType::Land, Some(_)) => {
                return Err(MapError::UnexpectedCost { link: idx, kind: "land" })
            }
            (RawLinkType::Sea, Some(_)) => {
                return Err(MapError::UnexpectedCost { link: idx, kind: "sea" })
            }
        };
        links.push((link.cities, kind));
    }
    GameMap::from_parts(names, links)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

/// An undirected connection between two cities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: LinkId,
    pub ends: [CityId; 2],
    pub kind: LinkKind,
}

impl Link {
    pub fn touches(&self, city: CityId) -> bool {
        self.ends.contains(&city)
    }

    /// The endpoint that is not `city`, if the link touches `city` at all.
    pub fn other_end(&self, city: CityId) -> Option<CityId> {
        match self.ends {
            [a, b] if a == city => Some(b),
            [a, b] if b == city => Some(a),
            _ => None,
        }
    }
}

/// Read-only city graph shared by every game played on it.
#[derive(Clone, Debug)]
pub struct GameMap {
    cities: Vec<City>,
    links: Vec<Link>,
    /// Link ids touching each city, in map order.
    touching: Vec<Vec<LinkId>>,
    ports: Vec<bool>,
    fingerprint: u64,
}

impl GameMap {
    /// Build a map from city names and `(endpoints, kind)` pairs.
    pub fn from_parts(
        names: Vec<String>,
        raw_links: Vec<([u16; 2], LinkKind)>,
    ) -> Result<Self, MapError> {
        if names.is_empty() {
            return Err(MapError::Empty);
        }
        if names.len() > usize::from(u16::MAX) || raw_links.len() > usize::from(u16::MAX) {
            return Err(MapError::TooLarge);
        }

        let cities: Vec<City> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| City {
                id: CityId(i as u16),
                name,
            })
            .collect();

        let mut links = Vec::with_capacity(raw_links.len());
        let mut touching = vec![Vec::new(); cities.len()];
        let mut ports = vec![false; cities.len()];
        for (idx, ([a, b], kind)) in raw_links.into_iter().enumerate() {
            for city in [a, b] {
                if usize::from(city) >= cities.len() {
                    return Err(MapError::UnknownCity { link: idx, city });
                }
            }
            if a == b {
                return Err(MapError::SelfLink { link: idx, city: a });
            }
            if let LinkKind::Air { cost: 0 } = kind {
                return Err(MapError::ZeroAirCost { link: idx });
            }

            let id = LinkId(idx as u16);
            for city in [a, b] {
                touching[usize::from(city)].push(id);
                if kind.is_sea() {
                    ports[usize::from(city)] = true;
                }
            }
            links.push(Link {
                id,
                ends: [CityId(a), CityId(b)],
                kind,
            });
        }

        let bytes = rmp_serde::to_vec_named(&(&cities, &links))?;
        let fingerprint = hash_bytes_fnv1a64(&bytes);

        Ok(Self {
            cities,
            links,
            touching,
            ports,
            fingerprint,
        })
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn contains(&self, city: CityId) -> bool {
        city.index() < self.cities.len()
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id.index())
    }

    pub fn city_name(&self, id: CityId) -> &str {
        self.city(id).map_or("?", |c| c.name.as_str())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Links with `city` as an endpoint, in map order.
    pub fn links_touching(&self, city: CityId) -> impl Iterator<Item = &Link> + '_ {
        self.touching
            .get(city.index())
            .into_iter()
            .flatten()
            .filter_map(|id| self.link(*id))
    }

    /// Links leaving `city`, each paired with the city it leads to.
    pub fn links_from(&self, city: CityId) -> impl Iterator<Item = (&Link, CityId)> + '_ {
        self.links_touching(city)
            .filter_map(move |link| Some((link, link.other_end(city)?)))
    }

    /// A port is any city with at least one sea link.
    pub fn is_port(&self, city: CityId) -> bool {
        self.ports.get(city.index()).copied().unwrap_or(false)
    }

    /// Stable hash of the map content, used to refuse restoring a saved
    /// game against a different map.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}
