pub mod ads;
pub mod economy;
pub mod rewards;
