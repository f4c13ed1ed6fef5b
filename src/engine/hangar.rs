// A player's garage: credits, robots, purchases and battle rewards.

use serde::Serialize;
use thiserror::Error;

use super::catalog::find_part;
use super::config::STARTING_CREDITS;
use super::progression::{gain_experience, BattleOutcome, LevelProgress};
use super::robot::Robot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HangarError {
    #[error("part '{0}' not found")]
    PartNotFound(String),
    #[error("robot {0} not found")]
    RobotNotFound(i64),
    #[error("not enough credits: part costs {needed}, you have {available}")]
    InsufficientCredits { needed: i64, available: i64 },
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub credits: i64,
    pub robots: Vec<Robot>,
    pub active_robot_id: Option<i64>,
    pub wins: i64,
    pub losses: i64,
}

/// What a finished battle paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReward {
    pub credits: i64,
    pub experience: i64,
    pub progress: LevelProgress,
}

impl Player {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            credits: STARTING_CREDITS,
            robots: Vec::new(),
            active_robot_id: None,
            wins: 0,
            losses: 0,
        }
    }

    pub fn robot(&self, robot_id: i64) -> Option<&Robot> {
        self.robots.iter().find(|r| r.id == robot_id)
    }

    fn robot_mut(&mut self, robot_id: i64) -> Result<&mut Robot, HangarError> {
        self.robots
            .iter_mut()
            .find(|r| r.id == robot_id)
            .ok_or(HangarError::RobotNotFound(robot_id))
    }

    pub fn active_robot(&self) -> Option<&Robot> {
        self.active_robot_id.and_then(|id| self.robot(id))
    }

    /// Add an empty robot and make it the active one.
    pub fn create_robot(&mut self, id: i64, name: &str) -> &Robot {
        self.robots.push(Robot::new(id, name));
        self.active_robot_id = Some(id);
        &self.robots[self.robots.len() - 1]
    }

    pub fn set_active_robot(&mut self, robot_id: i64) -> Result<(), HangarError> {
        if self.robot(robot_id).is_none() {
            return Err(HangarError::RobotNotFound(robot_id));
        }
        self.active_robot_id = Some(robot_id);
        Ok(())
    }

    /// Buy `part_id` and install it on `robot_id`, replacing the slot's
    /// current part. Nothing changes on error.
    pub fn buy_part(&mut self, part_id: &str, robot_id: i64) -> Result<&Robot, HangarError> {
        let part = find_part(part_id).ok_or_else(|| HangarError::PartNotFound(part_id.to_string()))?;
        if self.credits < part.cost {
            return Err(HangarError::InsufficientCredits {
                needed: part.cost,
                available: self.credits,
            });
        }
        let credits = self.credits - part.cost;
        let robot = self.robot_mut(robot_id)?;
        robot.equip(part);
        self.credits = credits;
        self.robot(robot_id).ok_or(HangarError::RobotNotFound(robot_id))
    }

    /// Pay out a battle fought by `robot_id`: record, credits, and
    /// `experience` for that robot. Nothing changes on error.
    pub fn record_battle(
        &mut self,
        outcome: BattleOutcome,
        robot_id: i64,
        experience: i64,
    ) -> Result<BattleReward, HangarError> {
        let robot = self.robot_mut(robot_id)?;
        let progress = gain_experience(robot.level, robot.experience, experience);
        robot.level = progress.level;
        robot.experience = progress.experience;

        match outcome {
            BattleOutcome::Win => self.wins += 1,
            BattleOutcome::Loss => self.losses += 1,
        }
        self.credits = self.credits.saturating_add(outcome.credits());

        Ok(BattleReward {
            credits: outcome.credits(),
            experience,
            progress,
        })
    }
}
