/// Stable identifier of a unit within an encounter.
///
/// The player is always [`UnitId::PLAYER`]; enemies receive ids in spawn order
/// starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl UnitId {
    pub const PLAYER: UnitId = UnitId(0);

    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_player() {
            write!(f, "player")
        } else {
            write!(f, "enemy#{}", self.0)
        }
    }
}

/// A combatant with hit points.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
}

impl Unit {
    pub fn new(id: UnitId, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            hp: max_hp,
            max_hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtracts `amount` from HP, saturating at zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        before - self.hp
    }

    /// Restores up to `amount` HP without exceeding `max_hp`. Returns the HP gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }
}
