pub mod controller;
pub mod dialog;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod scene;
