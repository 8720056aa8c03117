pub mod simulator_routes;
pub mod vehicle_routes;
