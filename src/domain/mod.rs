pub mod character;
pub mod enemy;
pub mod entity;
pub mod geometry;
pub mod physics;
pub mod platform;
pub mod rules;
pub mod spawner;
pub mod tile;
