// Fantasy football draft-value engine: starter allocation, VOR/VOLS
// baselines, VONA projection and the persisted draft log.

pub mod config;
pub mod db;
pub mod draft;
pub mod player;
pub mod projections;
pub mod valuation;
