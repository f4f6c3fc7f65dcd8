//! # Dice Face Algebra
//!
//! Face bookkeeping for the rolling die. A roll never changes which colors
//! the die carries, only which face each color sits on.

use crate::{ColorType, Direction, Position, RoliceError, RoliceResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// Face slots of the die, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceFace {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl DiceFace {
    /// All faces in storage order.
    pub const ALL: [DiceFace; 6] = [
        DiceFace::Top,
        DiceFace::Bottom,
        DiceFace::Front,
        DiceFace::Back,
        DiceFace::Left,
        DiceFace::Right,
    ];

    /// Storage index of this face.
    pub fn index(self) -> usize {
        match self {
            DiceFace::Top => 0,
            DiceFace::Bottom => 1,
            DiceFace::Front => 2,
            DiceFace::Back => 3,
            DiceFace::Left => 4,
            DiceFace::Right => 5,
        }
    }
}

use DiceFace::{Back, Bottom, Front, Left, Right, Top};

/// Source slot for every destination slot, per roll direction.
///
/// After rolling, `new[face] = old[ROLL_MAP[face]]`.
const ROLL_UP: [DiceFace; 6] = [Back, Front, Top, Bottom, Left, Right];
const ROLL_DOWN: [DiceFace; 6] = [Front, Back, Bottom, Top, Left, Right];
const ROLL_RIGHT: [DiceFace; 6] = [Left, Right, Front, Back, Bottom, Top];
const ROLL_LEFT: [DiceFace; 6] = [Right, Left, Front, Back, Top, Bottom];

/// Colors currently shown on each face of the die.
///
/// # Examples
///
/// ```
/// use rolice::{ColorType, DiceFace, DiceFaces, Direction};
///
/// let faces = DiceFaces::standard();
/// let rolled = faces.rotate(Direction::Up);
/// assert_eq!(rolled.bottom_color(), faces.face(DiceFace::Front));
/// assert_eq!(rolled.rotate(Direction::Down), faces);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiceFaces {
    faces: [ColorType; 6],
}

impl DiceFaces {
    /// Creates a die from colors in [`DiceFace::ALL`] order.
    pub fn new(faces: [ColorType; 6]) -> Self {
        Self { faces }
    }

    /// Creates a die from a slice, which must hold exactly six colors.
    pub fn from_slice(faces: &[ColorType]) -> RoliceResult<Self> {
        let faces: [ColorType; 6] = faces.try_into().map_err(|_| {
            RoliceError::InvalidState(format!(
                "A die needs exactly 6 face colors, got {}",
                faces.len()
            ))
        })?;
        Ok(Self::new(faces))
    }

    /// The stock die: red top, blue bottom, green front, yellow back,
    /// orange left, purple right.
    pub fn standard() -> Self {
        Self::new([
            ColorType::Red,
            ColorType::Blue,
            ColorType::Green,
            ColorType::Yellow,
            ColorType::Orange,
            ColorType::Purple,
        ])
    }

    /// Color on the given face.
    pub fn face(&self, face: DiceFace) -> ColorType {
        self.faces[face.index()]
    }

    /// Color touching the floor.
    pub fn bottom_color(&self) -> ColorType {
        self.face(DiceFace::Bottom)
    }

    /// Color facing up.
    pub fn top_color(&self) -> ColorType {
        self.face(DiceFace::Top)
    }

    /// All face colors in [`DiceFace::ALL`] order.
    pub fn as_array(&self) -> &[ColorType; 6] {
        &self.faces
    }

    /// Returns the face assignment after rolling one cell in `direction`.
    pub fn rotate(&self, direction: Direction) -> Self {
        let map = match direction {
            Direction::Up => &ROLL_UP,
            Direction::Down => &ROLL_DOWN,
            Direction::Right => &ROLL_RIGHT,
            Direction::Left => &ROLL_LEFT,
        };

        let mut faces = [ColorType::default(); 6];
        for (slot, source) in faces.iter_mut().zip(map.iter()) {
            *slot = self.faces[source.index()];
        }
        Self { faces }
    }

    /// Rolls by a raw grid delta.
    ///
    /// Only unit cardinal deltas are accepted; anything else is rejected
    /// instead of being mapped onto a default roll.
    pub fn rotate_by_delta(&self, delta: Position) -> RoliceResult<Self> {
        match Direction::from_delta(delta) {
            Some(direction) => Ok(self.rotate(direction)),
            None => {
                warn!("Rejecting dice roll with unknown direction {}", delta);
                Err(RoliceError::InvalidDirection {
                    dx: delta.x,
                    dy: delta.y,
                })
            }
        }
    }
}
