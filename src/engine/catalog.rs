// Static game content: cloud services, robot parts, the AI enemy roster.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::robot::Combatant;
use super::stats::StatBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartSlot {
    Head,
    Body,
    Arms,
    Legs,
}

impl PartSlot {
    pub const ALL: [PartSlot; 4] = [PartSlot::Head, PartSlot::Body, PartSlot::Arms, PartSlot::Legs];

    pub fn as_str(self) -> &'static str {
        match self {
            PartSlot::Head => "head",
            PartSlot::Body => "body",
            PartSlot::Arms => "arms",
            PartSlot::Legs => "legs",
        }
    }
}

impl fmt::Display for PartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "head" => Ok(PartSlot::Head),
            "body" => Ok(PartSlot::Body),
            "arms" => Ok(PartSlot::Arms),
            "legs" => Ok(PartSlot::Legs),
            other => Err(format!("unknown part slot '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Compute,
    Storage,
    Database,
    Ai,
    Security,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudService {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ServiceCategory,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotPart {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub slot: PartSlot,
    #[serde(flatten)]
    pub stats: StatBlock,
    pub cost: i64,
    pub cloud_service: &'static str,
    pub description: &'static str,
}

const fn service(
    id: &'static str,
    name: &'static str,
    category: ServiceCategory,
    description: &'static str,
) -> CloudService {
    CloudService {
        id,
        name,
        category,
        description,
    }
}

const fn part(
    id: &'static str,
    name: &'static str,
    slot: PartSlot,
    stats: [i32; 4],
    cost: i64,
    cloud_service: &'static str,
    description: &'static str,
) -> RobotPart {
    RobotPart {
        id,
        name,
        slot,
        stats: StatBlock::new(stats[0], stats[1], stats[2], stats[3]),
        cost,
        cloud_service,
        description,
    }
}

pub const CLOUD_SERVICES: &[CloudService] = &[
    service(
        "ecs",
        "Elastic Compute Service",
        ServiceCategory::Compute,
        "Secure and flexible virtual cloud servers for reliable computing.",
    ),
    service(
        "sae",
        "Serverless App Engine",
        ServiceCategory::Compute,
        "Fully managed PaaS platform for application deployment without infrastructure concerns.",
    ),
    service(
        "oss",
        "Object Storage Service",
        ServiceCategory::Storage,
        "Secure, cost-effective, and scalable cloud storage service.",
    ),
    service(
        "rds",
        "Relational Database Service",
        ServiceCategory::Database,
        "Fully managed database service supporting MySQL, SQL Server, PostgreSQL, and MariaDB.",
    ),
    service(
        "fc",
        "Function Compute",
        ServiceCategory::Compute,
        "Serverless platform for event-driven applications without managing infrastructure.",
    ),
    service(
        "pai",
        "Machine Learning Platform",
        ServiceCategory::Ai,
        "Machine learning platform with algorithms and tools for deep learning.",
    ),
    service(
        "cdn",
        "Content Delivery Network",
        ServiceCategory::Network,
        "Distribute content to users across the world with low latency.",
    ),
    service(
        "sls",
        "Log Service",
        ServiceCategory::Ai,
        "One-stop service for log collection, processing, analysis, and visualization.",
    ),
    service(
        "cas",
        "Security Center",
        ServiceCategory::Security,
        "Security management service for cloud resources and hosts.",
    ),
    service(
        "dts",
        "Data Transmission Service",
        ServiceCategory::Database,
        "Secure, scalable data transmission and synchronization service.",
    ),
    service(
        "pvtz",
        "Private Zone DNS",
        ServiceCategory::Network,
        "Private DNS resolution and management service for VPC networks.",
    ),
    service(
        "arms",
        "Application Real-Time Monitoring",
        ServiceCategory::Ai,
        "End-to-end application performance monitoring and diagnostics.",
    ),
    service(
        "cfw",
        "Cloud Firewall",
        ServiceCategory::Security,
        "Cloud-native firewall service for traffic control and security protection.",
    ),
    service(
        "polardb",
        "PolarDB",
        ServiceCategory::Database,
        "Cloud-native database service with high performance and scalability.",
    ),
    service(
        "nas",
        "Network Attached Storage",
        ServiceCategory::Storage,
        "Fully managed file storage service for compute instances.",
    ),
];

// Stat order: [power, defense, speed, energy]
pub const PARTS: &[RobotPart] = &[
    part(
        "head-1",
        "ECS Compute Core",
        PartSlot::Head,
        [15, 10, 5, 20],
        300,
        "ecs",
        "Advanced computing core powered by Alibaba Cloud ECS, providing enhanced calculation capabilities.",
    ),
    part(
        "head-2",
        "PAI Neural Net",
        PartSlot::Head,
        [10, 5, 25, 15],
        450,
        "pai",
        "AI-driven neural network processor that learns from each battle, powered by Alibaba Cloud PAI.",
    ),
    part(
        "head-3",
        "Security Sensor Array",
        PartSlot::Head,
        [5, 25, 15, 10],
        350,
        "cas",
        "Advanced security sensors powered by Alibaba Cloud Security Center for improved threat detection.",
    ),
    part(
        "head-4",
        "ARMS Tactical Scanner",
        PartSlot::Head,
        [20, 15, 20, 15],
        550,
        "arms",
        "Real-time tactical analysis system powered by Alibaba Cloud ARMS for battlefield advantage.",
    ),
    part(
        "head-5",
        "CFW Quantum Processor",
        PartSlot::Head,
        [15, 30, 10, 25],
        600,
        "cfw",
        "Advanced defensive processor with quantum encryption powered by Alibaba Cloud Firewall.",
    ),
    part(
        "body-1",
        "OSS Data Core",
        PartSlot::Body,
        [10, 30, 5, 25],
        500,
        "oss",
        "Robust data storage core powered by Alibaba Cloud OSS, providing high durability and resilience.",
    ),
    part(
        "body-2",
        "RDS Power Matrix",
        PartSlot::Body,
        [20, 20, 10, 20],
        400,
        "rds",
        "Balanced power distribution system powered by Alibaba Cloud RDS for optimal performance.",
    ),
    part(
        "body-3",
        "Log Service Reactor",
        PartSlot::Body,
        [30, 15, 5, 30],
        550,
        "sls",
        "High-energy reactor core with real-time monitoring powered by Alibaba Cloud Log Service.",
    ),
    part(
        "body-4",
        "PolarDB Fusion Core",
        PartSlot::Body,
        [35, 25, 10, 35],
        700,
        "polardb",
        "Advanced fusion reactor with millisecond response time powered by Alibaba Cloud PolarDB.",
    ),
    part(
        "body-5",
        "NAS Storage Matrix",
        PartSlot::Body,
        [15, 40, 5, 25],
        650,
        "nas",
        "Ultra-dense armor plating with integrated storage systems powered by Alibaba Cloud NAS.",
    ),
    part(
        "arms-1",
        "Function Compute Blasters",
        PartSlot::Arms,
        [35, 5, 15, 20],
        450,
        "fc",
        "Event-driven weapon system powered by Alibaba Cloud Function Compute for on-demand firepower.",
    ),
    part(
        "arms-2",
        "Security Shield Gauntlets",
        PartSlot::Arms,
        [10, 30, 10, 15],
        400,
        "cas",
        "Defensive arm enhancements with active protection powered by Alibaba Cloud Security Center.",
    ),
    part(
        "arms-3",
        "Machine Learning Manipulators",
        PartSlot::Arms,
        [20, 10, 25, 20],
        500,
        "pai",
        "Adaptive arm system that learns and improves with each use, powered by Alibaba Cloud PAI.",
    ),
    part(
        "arms-4",
        "Serverless Pulse Cannons",
        PartSlot::Arms,
        [40, 5, 20, 25],
        650,
        "sae",
        "High-powered energy weapons that scale with battle intensity, powered by Alibaba Cloud SAE.",
    ),
    part(
        "arms-5",
        "DTS Quantum Gauntlets",
        PartSlot::Arms,
        [25, 25, 15, 20],
        550,
        "dts",
        "Balanced combat system with real-time data synchronization powered by Alibaba Cloud DTS.",
    ),
    part(
        "legs-1",
        "CDN Speed Thrusters",
        PartSlot::Legs,
        [5, 10, 40, 20],
        450,
        "cdn",
        "High-speed movement system utilizing Alibaba Cloud CDN principles for optimal acceleration.",
    ),
    part(
        "legs-2",
        "Elastic Compute Stabilizers",
        PartSlot::Legs,
        [10, 20, 20, 25],
        400,
        "ecs",
        "Balanced movement platform with dynamic resource allocation powered by Alibaba Cloud ECS.",
    ),
    part(
        "legs-3",
        "Database Anchor Treads",
        PartSlot::Legs,
        [15, 30, 10, 20],
        350,
        "rds",
        "Sturdy movement system with high stability powered by Alibaba Cloud RDS architecture.",
    ),
    part(
        "legs-4",
        "Private Zone Hover System",
        PartSlot::Legs,
        [10, 15, 45, 30],
        600,
        "pvtz",
        "Advanced hover system with private network routing powered by Alibaba Cloud Private Zone DNS.",
    ),
    part(
        "legs-5",
        "Firewall Jump Jets",
        PartSlot::Legs,
        [20, 20, 35, 25],
        550,
        "cfw",
        "Secure high-mobility system with intrusion prevention powered by Alibaba Cloud Firewall.",
    ),
];

/// A roster opponent. Roster stats are tuned by hand rather than summed from parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnemyRobot {
    pub id: &'static str,
    pub name: &'static str,
    pub level: i32,
    pub stats: StatBlock,
}

impl EnemyRobot {
    pub fn combatant(&self) -> Combatant {
        Combatant {
            name: self.name.to_string(),
            level: self.level,
            stats: self.stats,
        }
    }
}

const fn enemy(id: &'static str, name: &'static str, level: i32, stats: [i32; 4]) -> EnemyRobot {
    EnemyRobot {
        id,
        name,
        level,
        stats: StatBlock::new(stats[0], stats[1], stats[2], stats[3]),
    }
}

pub const ENEMIES: &[EnemyRobot] = &[
    enemy("enemy-1", "CloudCrusher", 1, [70, 55, 65, 85]),
    enemy("enemy-2", "DataDestroyer", 2, [60, 75, 55, 70]),
    enemy("enemy-3", "NetworkNinja", 3, [80, 50, 90, 75]),
    enemy("enemy-4", "PolarPunisher", 4, [90, 60, 70, 85]),
    enemy("enemy-5", "FirewallPhantom", 5, [75, 85, 65, 80]),
    enemy("enemy-6", "ServerlessStriker", 6, [95, 40, 90, 70]),
    enemy("enemy-7", "StorageTitan", 7, [60, 100, 40, 90]),
];

pub fn find_part(id: &str) -> Option<&'static RobotPart> {
    PARTS.iter().find(|p| p.id == id)
}

pub fn find_service(id: &str) -> Option<&'static CloudService> {
    CLOUD_SERVICES.iter().find(|s| s.id == id)
}

pub fn find_enemy(id: &str) -> Option<&'static EnemyRobot> {
    ENEMIES.iter().find(|e| e.id == id)
}

pub fn random_enemy<R: Rng + ?Sized>(rng: &mut R) -> &'static EnemyRobot {
    // ENEMIES is a non-empty constant
    ENEMIES.choose(rng).unwrap_or(&ENEMIES[0])
}

/// Marketplace query. Every `None` field matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartFilter {
    pub slot: Option<PartSlot>,
    pub category: Option<ServiceCategory>,
    pub max_cost: Option<i64>,
    pub search: Option<String>,
}

impl PartFilter {
    pub fn matches(&self, part: &RobotPart) -> bool {
        if self.slot.is_some_and(|slot| slot != part.slot) {
            return false;
        }
        if self.max_cost.is_some_and(|max| part.cost > max) {
            return false;
        }
        if let Some(category) = self.category {
            match find_service(part.cloud_service) {
                Some(s) if s.category == category => {}
                _ => return false,
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !part.name.to_lowercase().contains(&needle)
                && !part.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    pub fn apply(&self) -> Vec<&'static RobotPart> {
        PARTS.iter().filter(|p| self.matches(p)).collect()
    }
}
