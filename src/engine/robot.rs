use serde::{Deserialize, Serialize};

use super::catalog::{find_part, PartSlot, RobotPart};
use super::config::{LEVEL_STAT_GROWTH, STARTING_LEVEL};
use super::stats::StatBlock;

/// One optional part per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Loadout {
    pub head: Option<&'static RobotPart>,
    pub body: Option<&'static RobotPart>,
    pub arms: Option<&'static RobotPart>,
    pub legs: Option<&'static RobotPart>,
}

impl Loadout {
    /// Rebuild a loadout from stored part ids. Unknown ids are skipped.
    pub fn from_ids(
        head: Option<&str>,
        body: Option<&str>,
        arms: Option<&str>,
        legs: Option<&str>,
    ) -> Self {
        Self {
            head: head.and_then(find_part),
            body: body.and_then(find_part),
            arms: arms.and_then(find_part),
            legs: legs.and_then(find_part),
        }
    }

    pub fn get(&self, slot: PartSlot) -> Option<&'static RobotPart> {
        match slot {
            PartSlot::Head => self.head,
            PartSlot::Body => self.body,
            PartSlot::Arms => self.arms,
            PartSlot::Legs => self.legs,
        }
    }

    fn slot_mut(&mut self, slot: PartSlot) -> &mut Option<&'static RobotPart> {
        match slot {
            PartSlot::Head => &mut self.head,
            PartSlot::Body => &mut self.body,
            PartSlot::Arms => &mut self.arms,
            PartSlot::Legs => &mut self.legs,
        }
    }

    /// Install `part` in its slot, returning whatever it replaced.
    pub fn equip(&mut self, part: &'static RobotPart) -> Option<&'static RobotPart> {
        self.slot_mut(part.slot).replace(part)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static RobotPart> + '_ {
        PartSlot::ALL.into_iter().filter_map(|slot| self.get(slot))
    }

    pub fn stats(&self) -> StatBlock {
        self.iter().map(|p| p.stats).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    pub id: i64,
    pub name: String,
    pub parts: Loadout,
    pub level: i32,
    pub experience: i64,
}

impl Robot {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parts: Loadout::default(),
            level: STARTING_LEVEL,
            experience: 0,
        }
    }

    /// Base stats: always the sum of installed parts.
    pub fn stats(&self) -> StatBlock {
        self.parts.stats()
    }

    pub fn equip(&mut self, part: &'static RobotPart) -> Option<&'static RobotPart> {
        self.parts.equip(part)
    }

    pub fn combatant(&self) -> Combatant {
        Combatant::from_parts(&self.name, self.level, self.stats())
    }
}

/// What a battle needs to know about a robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub level: i32,
    pub stats: StatBlock,
}

impl Combatant {
    /// Effective stats for a part-built robot: each level above the first
    /// grows every stat by 10%, rounding at every step.
    pub fn from_parts(name: &str, level: i32, base: StatBlock) -> Self {
        let stats = (STARTING_LEVEL..level.max(STARTING_LEVEL))
            .fold(base, |acc, _| acc.scaled(LEVEL_STAT_GROWTH));
        Self {
            name: name.to_string(),
            level,
            stats,
        }
    }
}
