pub mod check;
pub mod episodes;
pub mod listing;
pub mod menu;
pub mod output;
pub mod servers;
