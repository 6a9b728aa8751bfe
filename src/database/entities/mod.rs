pub mod farm_certificates;
pub mod farm_internal_applications;
pub mod farm_locations;
pub mod farms;
pub mod management_zones;
pub mod users;
