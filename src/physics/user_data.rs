use super::*;

const OWNER_OFFSET: u32 = 32;
const KIND_OFFSET: u32 = 64;
const FACTION_OFFSET: u32 = 72;
const MASSIVE_OFFSET: u32 = 80;
const MASSIVE_FLAG: u128 = 1 << MASSIVE_OFFSET;
const HITS_ALLIES_OFFSET: u32 = 81;
const HITS_ALLIES_FLAG: u128 = 1 << HITS_ALLIES_OFFSET;

/// Same value on a body and its collider.
/// - 32: object id
/// - 32: owner id (the object's own id when it has no owner)
/// - 8: kind
/// - 8: faction (0 is none)
/// - 1: massive
/// - 1: hits_allies
///
/// Everything the contact filter needs, so it never touches objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserData {
    pub id: ObjId,
    pub owner: ObjId,
    pub kind: ObjKind,
    pub faction: Option<Faction>,
    pub massive: bool,
    pub hits_allies: bool,
}
impl UserData {
    pub fn new(id: ObjId, kind: ObjKind) -> Self {
        Self {
            id,
            owner: id,
            kind,
            faction: None,
            massive: false,
            hits_allies: false,
        }
    }

    pub fn with_owner(mut self, owner: Option<ObjId>) -> Self {
        self.owner = owner.unwrap_or(self.id);
        self
    }

    pub fn with_faction(mut self, faction: Option<Faction>) -> Self {
        self.faction = faction;
        self
    }

    pub fn with_flags(mut self, massive: bool, hits_allies: bool) -> Self {
        self.massive = massive;
        self.hits_allies = hits_allies;
        self
    }

    pub fn pack(self) -> u128 {
        self.id.0 as u128
            | (self.owner.0 as u128) << OWNER_OFFSET
            | (self.kind as u8 as u128) << KIND_OFFSET
            | (Faction::to_bits(self.faction) as u128) << FACTION_OFFSET
            | (self.massive as u128) << MASSIVE_OFFSET
            | (self.hits_allies as u128) << HITS_ALLIES_OFFSET
    }

    /// `None` if the kind bits are not a known kind.
    pub fn unpack(user_data: u128) -> Option<Self> {
        Some(Self {
            id: ObjId(user_data as u32),
            owner: ObjId((user_data >> OWNER_OFFSET) as u32),
            kind: ObjKind::from_bits((user_data >> KIND_OFFSET) as u8)?,
            faction: Faction::from_bits((user_data >> FACTION_OFFSET) as u8),
            massive: user_data & MASSIVE_FLAG != 0,
            hits_allies: user_data & HITS_ALLIES_FLAG != 0,
        })
    }
}

#[test]
fn test_pack_unpack() {
    let user_data = UserData::new(ObjId(u32::MAX - 3), ObjKind::Projectile)
        .with_owner(Some(ObjId(77)))
        .with_faction(Some(Faction::Ehar))
        .with_flags(true, false);

    assert_eq!(UserData::unpack(user_data.pack()), Some(user_data));
}

#[test]
fn test_default_owner_is_self() {
    let user_data = UserData::new(ObjId(5), ObjKind::Ship).with_owner(None);
    assert_eq!(user_data.owner, ObjId(5));
}

#[test]
fn test_unknown_kind() {
    assert_eq!(UserData::unpack(0xFF << KIND_OFFSET), None);
}
