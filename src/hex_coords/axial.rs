/// Axial hexagon coordinates and their two textual encodings
///
/// Internally a cell is always an `AxialCoord`. Strings only appear at the
/// edges: the internal form `"q,r"` and the display form `"p3n2"` (sign
/// prefix + magnitude for q, then for r).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

/// The two textual encodings a hexagon id can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexIdFormat {
    /// `"q,r"`, e.g. `"3,-2"`
    Internal,
    /// `"p|q|n|r|"`, e.g. `"p3n2"`
    Display,
}

impl HexIdFormat {
    /// Detect which encoding a string uses, if any.
    pub fn detect(id: &str) -> Option<Self> {
        if split_display(id).is_some() {
            Some(HexIdFormat::Display)
        } else if id.contains(',') {
            Some(HexIdFormat::Internal)
        } else {
            None
        }
    }
}

/// Axial coordinate of a hexagon; `s = -q - r` is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

/// Axial offsets of the six neighbours, counter-clockwise starting east.
const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl AxialCoord {
    pub const ORIGIN: AxialCoord = AxialCoord { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Offset-row layout to axial: `q = col - floor(row / 2)`, `r = row`.
    pub fn from_row_col(row: i32, col: i32) -> Self {
        Self {
            q: col - row.div_euclid(2),
            r: row,
        }
    }

    /// Inverse of [`AxialCoord::from_row_col`], returned as `(row, col)`.
    pub fn to_row_col(&self) -> (i32, i32) {
        (self.r, self.q + self.r.div_euclid(2))
    }

    pub fn neighbors(&self) -> [AxialCoord; 6] {
        NEIGHBOR_OFFSETS.map(|(dq, dr)| AxialCoord::new(self.q + dq, self.r + dr))
    }

    /// Number of steps between two cells on the hex lattice.
    pub fn distance(&self, other: &AxialCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds)
    }

    /// `"q,r"`
    pub fn internal_id(&self) -> String {
        format!("{},{}", self.q, self.r)
    }

    /// `"p3n2"` for q = 3, r = -2
    pub fn display_id(&self) -> String {
        format!("{}{}", signed_part(self.q), signed_part(self.r))
    }

    /// Parse either encoding.
    pub fn parse(id: &str) -> Result<Self, IdError> {
        match HexIdFormat::detect(id) {
            Some(HexIdFormat::Display) => Self::parse_display(id),
            Some(HexIdFormat::Internal) => Self::parse_internal(id),
            None => Err(IdError::Malformed(id.to_string())),
        }
    }

    pub fn parse_internal(id: &str) -> Result<Self, IdError> {
        let mut parts = id.split(',');
        let (Some(q), Some(r), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(IdError::Malformed(id.to_string()));
        };
        let parse = |part: &str| {
            part.trim().parse::<i64>().map_err(|_| IdError::Malformed(id.to_string())).and_then(|v| {
                i32::try_from(v).map_err(|_| IdError::OutOfRange(id.to_string()))
            })
        };
        Ok(Self::new(parse(q)?, parse(r)?))
    }

    pub fn parse_display(id: &str) -> Result<Self, IdError> {
        let ((q_sign, q_abs), (r_sign, r_abs)) =
            split_display(id).ok_or_else(|| IdError::Malformed(id.to_string()))?;
        let value = |negative: bool, digits: &str| {
            let magnitude: i64 = digits.parse().map_err(|_| IdError::OutOfRange(id.to_string()))?;
            let signed = if negative { -magnitude } else { magnitude };
            i32::try_from(signed).map_err(|_| IdError::OutOfRange(id.to_string()))
        };
        Ok(Self::new(value(q_sign, q_abs)?, value(r_sign, r_abs)?))
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for AxialCoord {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AxialCoord::parse(s)
    }
}

fn signed_part(value: i32) -> String {
    let prefix = if value >= 0 { 'p' } else { 'n' };
    format!("{}{}", prefix, value.unsigned_abs())
}

/// Split `^[pn]\d+[pn]\d+$` into `((q_negative, q_digits), (r_negative, r_digits))`.
fn split_display(id: &str) -> Option<((bool, &str), (bool, &str))> {
    let sign = |c: u8| match c {
        b'p' => Some(false),
        b'n' => Some(true),
        _ => None,
    };
    let bytes = id.as_bytes();
    let q_negative = sign(*bytes.first()?)?;
    let rest = &id[1..];
    let q_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if q_len == 0 {
        return None;
    }
    let (q_digits, rest) = rest.split_at(q_len);
    let r_negative = sign(*rest.as_bytes().first()?)?;
    let r_digits = &rest[1..];
    if r_digits.is_empty() || !r_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(((q_negative, q_digits), (r_negative, r_digits)))
}

/// Internal id of an axial coordinate.
pub fn id_from_axial(coord: AxialCoord) -> String {
    coord.internal_id()
}

/// `"q,r"` to `"p3n2"`. Display ids pass through; anything unparseable is
/// returned unchanged.
pub fn display_id_from_internal(id: &str) -> String {
    match HexIdFormat::detect(id) {
        Some(HexIdFormat::Display) => id.to_string(),
        Some(HexIdFormat::Internal) => AxialCoord::parse_internal(id)
            .map(|c| c.display_id())
            .unwrap_or_else(|_| id.to_string()),
        None => id.to_string(),
    }
}

/// `"p3n2"` to `"q,r"`. Internal ids pass through; anything unparseable is
/// returned unchanged.
pub fn internal_id_from_display(id: &str) -> String {
    match HexIdFormat::detect(id) {
        Some(HexIdFormat::Display) => AxialCoord::parse_display(id)
            .map(|c| c.internal_id())
            .unwrap_or_else(|_| id.to_string()),
        _ => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_display_id_format() {
        assert_eq!(display_id_from_internal("3,-2"), "p3n2");
        assert_eq!(display_id_from_internal("0,0"), "p0p0");
        assert_eq!(display_id_from_internal("-1,2"), "n1p2");
        assert_eq!(display_id_from_internal("-10,-20"), "n10n20");
    }

    #[test]
    fn test_internal_id_from_display() {
        assert_eq!(internal_id_from_display("p3n2"), "3,-2");
        assert_eq!(internal_id_from_display("n1p2"), "-1,2");
        assert_eq!(internal_id_from_display("n0p0"), "0,0");
    }

    #[test]
    fn test_already_encoded_ids_pass_through() {
        assert_eq!(display_id_from_internal("p3n2"), "p3n2");
        assert_eq!(internal_id_from_display("3,-2"), "3,-2");
    }

    #[test]
    fn test_unparseable_ids_are_returned_unchanged() {
        for id in ["", "abc", "p3", "p3x2", "3,x", "1,2,3", "P3N2", "p-3n2", "q1r1"] {
            assert_eq!(display_id_from_internal(id), id, "display of {id:?}");
            assert_eq!(internal_id_from_display(id), id, "internal of {id:?}");
        }
    }

    #[test]
    fn test_round_trip_random_coordinates() {
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let q: i32 = rng.random_range(-100_000..100_000);
            let r: i32 = rng.random_range(-100_000..100_000);
            let internal = format!("{q},{r}");
            assert_eq!(internal_id_from_display(&display_id_from_internal(&internal)), internal);
        }
    }

    #[test]
    fn test_round_trip_extremes() {
        for (q, r) in [(i32::MAX, i32::MIN), (i32::MIN, 0), (0, i32::MAX)] {
            let internal = id_from_axial(AxialCoord::new(q, r));
            assert_eq!(internal_id_from_display(&display_id_from_internal(&internal)), internal);
        }
    }

    #[test]
    fn test_parse_either_encoding() {
        let expected = AxialCoord::new(3, -2);
        assert_eq!(AxialCoord::parse("3,-2").unwrap(), expected);
        assert_eq!(AxialCoord::parse(" 3, -2").unwrap(), expected);
        assert_eq!(AxialCoord::parse("p3n2").unwrap(), expected);
        assert_eq!("p3n2".parse::<AxialCoord>().unwrap(), expected);

        assert_eq!(AxialCoord::parse("zzz"), Err(IdError::Malformed("zzz".into())));
        assert_eq!(AxialCoord::parse("1,"), Err(IdError::Malformed("1,".into())));
        assert_eq!(
            AxialCoord::parse("p99999999999n1"),
            Err(IdError::OutOfRange("p99999999999n1".into()))
        );
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(HexIdFormat::detect("p0n1"), Some(HexIdFormat::Display));
        assert_eq!(HexIdFormat::detect("0,-1"), Some(HexIdFormat::Internal));
        assert_eq!(HexIdFormat::detect("hello"), None);
    }

    #[test]
    fn test_row_col_conversion() {
        assert_eq!(AxialCoord::from_row_col(0, 0), AxialCoord::new(0, 0));
        assert_eq!(AxialCoord::from_row_col(3, 2), AxialCoord::new(1, 3));
        // floor division for negative rows
        assert_eq!(AxialCoord::from_row_col(-1, 0), AxialCoord::new(1, -1));

        for row in -5..5 {
            for col in -5..5 {
                assert_eq!(AxialCoord::from_row_col(row, col).to_row_col(), (row, col));
            }
        }
    }

    #[test]
    fn test_neighbors_and_distance() {
        let origin = AxialCoord::ORIGIN;
        for n in origin.neighbors() {
            assert_eq!(origin.distance(&n), 1);
            assert_eq!(n.q + n.r + n.s(), 0);
        }
        assert_eq!(origin.distance(&AxialCoord::new(2, -1)), 2);
        assert_eq!(AxialCoord::new(-2, 2).distance(&AxialCoord::new(2, -2)), 4);
    }

    #[test]
    fn test_display_impl_is_internal_form() {
        assert_eq!(AxialCoord::new(-4, 7).to_string(), "-4,7");
    }
}
