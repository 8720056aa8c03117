pub mod simulator_controller;
pub mod vehicle_controller;
pub mod vehicle_state_controller;
