pub mod export;
pub mod scene;
pub mod ui;
