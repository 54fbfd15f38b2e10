use foundation::LngLat;
use geocoding::GeocodingError;

#[derive(Debug, Clone, PartialEq)]
pub enum MapStateError {
    /// An operation needed the render surface before `set_map` ran.
    MapNotReady,
    /// The reverse lookup succeeded but returned no candidate.
    NoCandidates { position: LngLat },
    Lookup(GeocodingError),
}

impl std::fmt::Display for MapStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapStateError::MapNotReady => write!(f, "map is not ready"),
            MapStateError::NoCandidates { position } => {
                write!(f, "reverse lookup returned no place at {position}")
            }
            MapStateError::Lookup(err) => write!(f, "reverse lookup failed: {err}"),
        }
    }
}

impl std::error::Error for MapStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapStateError::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GeocodingError> for MapStateError {
    fn from(err: GeocodingError) -> Self {
        MapStateError::Lookup(err)
    }
}
