pub mod division;
pub mod location;
pub mod weather;
pub mod weather_condition;
