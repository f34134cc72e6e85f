use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Laani,
    Ehar,
}
impl Faction {
    pub fn are_enemies(self, other: Self) -> bool {
        self != other
    }

    /// 0 is reserved for "no faction" when packed in physics user data.
    pub fn to_bits(faction: Option<Self>) -> u8 {
        match faction {
            None => 0,
            Some(Faction::Laani) => 1,
            Some(Faction::Ehar) => 2,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Faction::Laani),
            2 => Some(Faction::Ehar),
            _ => None,
        }
    }
}
