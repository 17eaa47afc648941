pub mod export;
pub mod new;
pub mod preview;
