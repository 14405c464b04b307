//! Agents and the social network connecting them

pub mod agent;
pub mod social;

pub use agent::Agent;
pub use social::SocialNetwork;
